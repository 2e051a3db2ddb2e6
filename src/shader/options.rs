//! 编译选项
//!
//! 两条编译路径共用同一份 `CompileOptions`：
//! FXC 使用 [`CompileOptions::legacy_flags`]，DXC 使用 [`CompileOptions::dxc_arguments`]。

use std::path::Path;

use crate::core::config::{DiagnosticsPolicy, ShaderConfig};

/// `D3DCOMPILE_DEBUG`
pub const D3DCOMPILE_DEBUG: u32 = 1 << 0;
/// `D3DCOMPILE_SKIP_OPTIMIZATION`
pub const D3DCOMPILE_SKIP_OPTIMIZATION: u32 = 1 << 2;

/// 编译选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// 入口函数名
    pub entry_point: String,
    /// `-Zi` / `D3DCOMPILE_DEBUG`
    pub debug: bool,
    /// `-Od` / `D3DCOMPILE_SKIP_OPTIMIZATION`
    pub skip_optimization: bool,
    /// `-Qembed_debug`，需要同时开启 `debug`
    pub embed_debug: bool,
    /// `-Zpr`
    pub row_major: bool,
    /// 诊断策略（仅 DXC 路径使用）
    pub diagnostics: DiagnosticsPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from(&ShaderConfig::default())
    }
}

impl From<&ShaderConfig> for CompileOptions {
    fn from(config: &ShaderConfig) -> Self {
        Self {
            entry_point: config.entry_point.clone(),
            debug: config.debug,
            skip_optimization: config.skip_optimization,
            embed_debug: config.embed_debug,
            row_major: config.row_major,
            diagnostics: config.diagnostics,
        }
    }
}

impl CompileOptions {
    /// D3DCompileFromFile 的 `Flags1`
    ///
    /// 行优先只在 DXC 路径上开启，FXC 保持编译器默认布局。
    pub fn legacy_flags(&self) -> u32 {
        let mut flags = 0;
        if self.debug {
            flags |= D3DCOMPILE_DEBUG;
        }
        if self.skip_optimization {
            flags |= D3DCOMPILE_SKIP_OPTIMIZATION;
        }
        flags
    }

    /// IDxcCompiler3::Compile 的参数列表
    ///
    /// 第一个参数是源文件名，DXC 用它生成诊断信息中的文件名。
    pub fn dxc_arguments(&self, path: &Path, profile: &str) -> Vec<String> {
        let mut args = vec![
            path.to_string_lossy().into_owned(),
            "-E".to_string(),
            self.entry_point.clone(),
            "-T".to_string(),
            profile.to_string(),
        ];
        if self.debug {
            args.push("-Zi".to_string());
            if self.embed_debug {
                args.push("-Qembed_debug".to_string());
            }
        }
        if self.skip_optimization {
            args.push("-Od".to_string());
        }
        if self.row_major {
            args.push("-Zpr".to_string());
        }
        args
    }
}

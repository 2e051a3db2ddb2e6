//! 着色器编译包装
//!
//! `Shader` 把磁盘上的 HLSL 文件编译成管线状态对象可以直接使用的字节码。
//! 提供两条互相独立的编译路径：
//!
//! - **Legacy**：D3DCompiler（FXC），Shader Model 5.1 及以下
//! - **Toolchain**：DXC，Shader Model 6.0 及以上
//!
//! 两条路径各自保存一份产物，互不影响。
//!
//! # 使用示例
//!
//! ```no_run
//! # #[cfg(target_os = "windows")]
//! # fn demo() -> dx_shader::core::ShaderResult<()> {
//! use dx_shader::gfx::dx12::DxcToolchain;
//! use dx_shader::shader::Shader;
//!
//! let toolchain = DxcToolchain::new()?;
//!
//! let mut vs = Shader::new();
//! vs.load_with_toolchain(&toolchain, "resources/shaders/TestVS.hlsl", "vs_6_0")?;
//! let bytecode = vs.toolchain_binary().unwrap().bytecode();
//! # let _ = bytecode;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod binary;
pub mod debug_output;
pub mod lazy;
pub mod options;
pub mod profile;

pub use backend::{CompileOutput, LegacyCompiler, ShaderToolchain};
pub use binary::{BinaryBlob, BinaryOrigin, CompiledShader};
pub use lazy::LazyToolchain;
pub use options::CompileOptions;
pub use profile::{ShaderProfile, ShaderStage};

use std::path::Path;

use tracing::{debug, info, info_span, warn};

use crate::core::config::DiagnosticsPolicy;
use crate::core::error::{ShaderError, ShaderResult};

/// 着色器编译包装
///
/// 持有最多两份编译产物（每条路径一份）。重新编译同一路径时旧产物被释放；
/// 编译失败后该路径的 getter 返回 `None`。
#[derive(Debug, Default)]
pub struct Shader {
    options: CompileOptions,
    legacy: Option<CompiledShader>,
    toolchain: Option<CompiledShader>,
}

impl Shader {
    /// 使用默认编译选项（入口 `main`、调试信息、关闭优化）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self { options, legacy: None, toolchain: None }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// 使用 D3DCompiler 编译
    ///
    /// 编译成功时返回新的产物，并保存供 [`Shader::legacy_binary`] 读取。
    pub fn load_legacy<C>(
        &mut self,
        compiler: &C,
        path: impl AsRef<Path>,
        profile: &str,
    ) -> ShaderResult<&CompiledShader>
    where
        C: LegacyCompiler + ?Sized,
    {
        let path = path.as_ref();
        let _span = info_span!("load_legacy", path = %path.display(), profile).entered();

        self.legacy = None;
        ensure_readable(path)?;

        if let Some(parsed) = ShaderProfile::parse(profile) {
            if !parsed.supported_by_legacy() {
                warn!(%parsed, "Profile targets shader model 6.0+, D3DCompiler will likely reject it");
            }
        }

        let output = compiler.compile_file(
            path,
            &self.options.entry_point,
            profile,
            self.options.legacy_flags(),
        )?;

        let object = match output.object {
            Some(object) => {
                if !output.diagnostics.is_empty() {
                    debug_output::report_warning(path, &output.diagnostics);
                }
                object
            }
            None => return Err(missing_object(path, output.diagnostics)),
        };

        let binary = CompiledShader::new(object, BinaryOrigin::Legacy);
        info!(size = binary.len(), "Compiled shader with D3DCompiler");
        Ok(&*self.legacy.insert(binary))
    }

    /// 使用 DXC 编译
    ///
    /// 默认策略下只要诊断流非空就返回 `CompileDiagnostic`，即使同时产生了目标代码。
    pub fn load_with_toolchain<T>(
        &mut self,
        toolchain: &T,
        path: impl AsRef<Path>,
        profile: &str,
    ) -> ShaderResult<&CompiledShader>
    where
        T: ShaderToolchain + ?Sized,
    {
        let path = path.as_ref();
        let _span = info_span!("load_with_toolchain", path = %path.display(), profile).entered();

        self.toolchain = None;
        ensure_readable(path)?;

        if let Some(parsed) = ShaderProfile::parse(profile) {
            if !parsed.requires_dxc() {
                warn!(%parsed, "DXC expects shader model 6.0 or later");
            }
        }

        let output = {
            let source = toolchain.load_source(path)?;
            let arguments = self.options.dxc_arguments(path, profile);
            debug!(?arguments, "Invoking DXC");
            toolchain.compile(&source, &arguments)?
        };

        let object = if output.has_diagnostics() {
            match (self.options.diagnostics, output.object) {
                (DiagnosticsPolicy::AllowWarnings, Some(object)) => {
                    debug_output::report_warning(path, &output.diagnostics);
                    object
                }
                _ => {
                    debug_output::report_error(path, &output.diagnostics);
                    return Err(ShaderError::CompileDiagnostic {
                        path: path.to_path_buf(),
                        text: output.diagnostics,
                    });
                }
            }
        } else {
            match output.object {
                Some(object) => object,
                None => return Err(missing_object(path, String::new())),
            }
        };

        let binary = CompiledShader::new(object, BinaryOrigin::Toolchain);
        info!(size = binary.len(), "Compiled shader with DXC");
        Ok(&*self.toolchain.insert(binary))
    }

    /// D3DCompiler 产物，未编译或上次编译失败时为 `None`
    pub fn legacy_binary(&self) -> Option<&CompiledShader> {
        self.legacy.as_ref()
    }

    /// DXC 产物，未编译或上次编译失败时为 `None`
    pub fn toolchain_binary(&self) -> Option<&CompiledShader> {
        self.toolchain.as_ref()
    }
}

/// 源文件必须在调用编译器之前确认可读
fn ensure_readable(path: &Path) -> ShaderResult<()> {
    let not_found = |reason: String| ShaderError::SourceNotFound {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| not_found(e.to_string()))?;
    if !metadata.is_file() {
        return Err(not_found("not a regular file".to_string()));
    }
    std::fs::File::open(path).map_err(|e| not_found(e.to_string()))?;
    Ok(())
}

/// 编译器没有返回目标代码
fn missing_object(path: &Path, diagnostics: String) -> ShaderError {
    if diagnostics.is_empty() {
        ShaderError::Invocation(format!("compiler produced no object code for {}", path.display()))
    } else {
        debug_output::report_error(path, &diagnostics);
        ShaderError::CompileDiagnostic { path: path.to_path_buf(), text: diagnostics }
    }
}

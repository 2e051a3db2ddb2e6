//! 编译后端接口
//!
//! `Shader` 只依赖这里的两个 trait，真正的编译器实现在 `gfx::dx12` 中（仅 Windows）。
//! 这样包装层的逻辑（诊断策略、产物替换、加载失败的判定）可以在任何平台上测试。

use std::fmt;
use std::path::Path;

use super::binary::BinaryBlob;
use crate::core::error::ShaderResult;

/// 一次编译调用的原始结果
///
/// 诊断文本与目标代码可以同时存在（例如只有警告），如何解释由 `Shader` 决定。
pub struct CompileOutput {
    /// 编译器输出的诊断文本，没有时为空字符串
    pub diagnostics: String,
    /// 目标代码
    pub object: Option<Box<dyn BinaryBlob>>,
}

impl CompileOutput {
    /// 只有目标代码
    pub fn object(blob: Box<dyn BinaryBlob>) -> Self {
        Self { diagnostics: String::new(), object: Some(blob) }
    }

    /// 只有诊断文本
    pub fn diagnostics(text: impl Into<String>) -> Self {
        Self { diagnostics: text.into(), object: None }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

impl fmt::Debug for CompileOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOutput")
            .field("diagnostics", &self.diagnostics)
            .field("object_len", &self.object.as_ref().map(|o| o.bytes().len()))
            .finish()
    }
}

/// D3DCompiler（FXC）编译路径
///
/// 实现应使用标准 include 处理（相对于源文件目录解析 `#include`）。
pub trait LegacyCompiler {
    /// 编译磁盘上的 HLSL 文件
    ///
    /// 着色器源码错误通过 `CompileOutput::diagnostics` 返回；
    /// 只有编译器本身无法工作时才返回 `Err`。
    fn compile_file(
        &self,
        path: &Path,
        entry_point: &str,
        profile: &str,
        flags: u32,
    ) -> ShaderResult<CompileOutput>;
}

/// DXC 编译路径
///
/// 一个工具链实例由创建 `Shader` 的上层持有，以引用的形式传给每次编译。
pub trait ShaderToolchain {
    /// 加载后的源码缓冲区，编译结束后即被释放
    type Source;

    /// 把源文件读入以 UTF-8 标记的缓冲区
    fn load_source(&self, path: &Path) -> ShaderResult<Self::Source>;

    /// 使用完整参数列表（第一个参数为源文件名）编译
    fn compile(&self, source: &Self::Source, arguments: &[String]) -> ShaderResult<CompileOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_output_constructors() {
        let output = CompileOutput::object(Box::new(vec![1u8, 2, 3]));
        assert!(!output.has_diagnostics());
        assert_eq!(output.object.as_ref().unwrap().bytes().len(), 3);

        let output = CompileOutput::diagnostics("error X3000: syntax error");
        assert!(output.has_diagnostics());
        assert!(output.object.is_none());
    }

    #[test]
    fn test_any_diagnostic_text_counts() {
        let output = CompileOutput { diagnostics: "\n".to_string(), object: None };
        assert!(output.has_diagnostics());
    }

    #[test]
    fn test_debug_shows_object_length() {
        let output = CompileOutput::object(Box::new(vec![0u8; 4]));
        let text = format!("{:?}", output);
        assert!(text.contains("object_len: Some(4)"));

        let text = format!("{:?}", CompileOutput::diagnostics("error X3000"));
        assert!(text.contains("error X3000"));
        assert!(text.contains("object_len: None"));
    }
}

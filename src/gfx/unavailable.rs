//! 非 Windows 平台上的占位编译器
//!
//! 系统着色器编译器只存在于 Windows，其它平台上所有编译请求都返回
//! `ShaderError::ToolchainUnavailable`。

use std::path::Path;

use crate::core::error::{ShaderError, ShaderResult};
use crate::shader::{CompileOutput, LegacyCompiler, ShaderToolchain};

#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

pub(crate) fn unavailable_error(compiler: &str) -> ShaderError {
    ShaderError::ToolchainUnavailable(format!("{} is only available on Windows", compiler))
}

impl LegacyCompiler for Unavailable {
    fn compile_file(&self, _: &Path, _: &str, _: &str, _: u32) -> ShaderResult<CompileOutput> {
        Err(unavailable_error("D3DCompiler"))
    }
}

impl ShaderToolchain for Unavailable {
    type Source = ();

    fn load_source(&self, _: &Path) -> ShaderResult<()> {
        Err(unavailable_error("DXC"))
    }

    fn compile(&self, _: &(), _: &[String]) -> ShaderResult<CompileOutput> {
        Err(unavailable_error("DXC"))
    }
}

//! D3DCompiler（FXC）编译路径
//!
//! 使用 `D3DCompileFromFile` 直接编译磁盘上的文件，`#include` 通过
//! `D3D_COMPILE_STANDARD_FILE_INCLUDE` 相对于源文件目录解析。

use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::path::Path;

use tracing::debug;
use windows::core::{HSTRING, PCSTR};
use windows::Win32::Graphics::Direct3D::Fxc::D3DCompileFromFile;
use windows::Win32::Graphics::Direct3D::{ID3DBlob, ID3DInclude};

use super::{blob_bytes, blob_text};
use crate::core::error::{ShaderError, ShaderResult};
use crate::shader::{BinaryBlob, CompileOutput, LegacyCompiler};

impl BinaryBlob for ID3DBlob {
    fn bytes(&self) -> &[u8] {
        unsafe { blob_bytes(self.GetBufferPointer(), self.GetBufferSize()) }
    }
}

/// D3DCompiler 编译器
///
/// `d3dcompiler_47.dll` 随系统提供，不需要额外初始化。
#[derive(Debug, Default, Clone, Copy)]
pub struct FxcCompiler;

impl FxcCompiler {
    pub fn new() -> Self {
        Self
    }
}

/// `D3D_COMPILE_STANDARD_FILE_INCLUDE`，值为 1 的哨兵指针
///
/// 不是真正的对象，不能被释放。
fn standard_file_include() -> ManuallyDrop<ID3DInclude> {
    ManuallyDrop::new(unsafe { std::mem::transmute::<usize, ID3DInclude>(1) })
}

fn c_string(value: &str, what: &str) -> ShaderResult<CString> {
    CString::new(value).map_err(|_| ShaderError::InvalidArgument(format!("{} contains NUL: {:?}", what, value)))
}

impl LegacyCompiler for FxcCompiler {
    fn compile_file(
        &self,
        path: &Path,
        entry_point: &str,
        profile: &str,
        flags: u32,
    ) -> ShaderResult<CompileOutput> {
        let file_name = HSTRING::from(path);
        let entry = c_string(entry_point, "entry point")?;
        let target = c_string(profile, "profile")?;
        let include = standard_file_include();

        let mut code: Option<ID3DBlob> = None;
        let mut errors: Option<ID3DBlob> = None;

        debug!(entry_point, profile, flags, "D3DCompileFromFile");
        let result = unsafe {
            D3DCompileFromFile(
                &file_name,
                None,
                &*include,
                PCSTR(entry.as_ptr() as *const u8),
                PCSTR(target.as_ptr() as *const u8),
                flags,
                0,
                &mut code,
                Some(&mut errors),
            )
        };

        let diagnostics = errors.as_ref().map(blob_text).unwrap_or_default();

        match result {
            Ok(()) => match code {
                Some(code) => Ok(CompileOutput { diagnostics, object: Some(Box::new(code)) }),
                None => Err(ShaderError::Invocation(
                    "D3DCompileFromFile succeeded without returning bytecode".to_string(),
                )),
            },
            // 源码错误时编译器会附带错误文本
            Err(_) if !diagnostics.is_empty() => Ok(CompileOutput::diagnostics(diagnostics)),
            Err(e) => Err(ShaderError::Invocation(format!("D3DCompileFromFile failed: {}", e))),
        }
    }
}

//! DirectX 12 着色器编译器实现
//!
//! 本模块包含真正调用系统编译器的代码（仅 Windows）：
//! - `fxc`: D3DCompiler（`D3DCompileFromFile`）
//! - `dxc`: DXC（`IDxcUtils` / `IDxcCompiler3`）

pub mod dxc;
pub mod fxc;

pub use dxc::DxcToolchain;
pub use fxc::FxcCompiler;

use std::ffi::c_void;

use crate::shader::BinaryBlob;

/// 把编译器 blob 的缓冲区视作字节切片
///
/// # Safety
///
/// `ptr` 必须指向至少 `len` 字节、并在返回的切片存活期间有效的内存。
unsafe fn blob_bytes<'a>(ptr: *mut c_void, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr as *const u8, len)
    }
}

/// 编译器错误 blob 中的文本，去掉结尾的 NUL
fn blob_text<B: BinaryBlob>(blob: &B) -> String {
    String::from_utf8_lossy(blob.bytes())
        .trim_end_matches('\0')
        .to_string()
}

//! 编译产物
//!
//! `CompiledShader` 独占持有编译器返回的二进制 blob，
//! 被 drop 时 blob 随之释放（COM 对象的 `Release` 由 `windows` crate 的 `Drop` 完成）。

use std::fmt;
use std::path::Path;

use crate::core::error::Result;

/// 可以被视作一段连续字节的编译器输出
///
/// Windows 上由 `ID3DBlob` 与 `IDxcBlob` 实现，测试和预编译文件使用 `Vec<u8>`。
pub trait BinaryBlob {
    /// blob 中的全部字节
    fn bytes(&self) -> &[u8];
}

impl BinaryBlob for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

/// 产物来自哪条编译路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOrigin {
    /// D3DCompiler（FXC）
    Legacy,
    /// DXC
    Toolchain,
}

/// 编译完成的着色器字节码
pub struct CompiledShader {
    blob: Box<dyn BinaryBlob>,
    origin: BinaryOrigin,
}

impl CompiledShader {
    /// 包装编译器返回的 blob
    pub fn new(blob: Box<dyn BinaryBlob>, origin: BinaryOrigin) -> Self {
        Self { blob, origin }
    }

    /// 从已有字节构造，例如读取磁盘上的 `.cso`
    pub fn from_bytes(bytes: Vec<u8>, origin: BinaryOrigin) -> Self {
        Self::new(Box::new(bytes), origin)
    }

    /// 产物来源
    pub fn origin(&self) -> BinaryOrigin {
        self.origin
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.blob.bytes()
    }

    /// 字节码起始地址
    pub fn as_ptr(&self) -> *const u8 {
        self.as_bytes().as_ptr()
    }

    /// 字节码大小（字节）
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// 把字节码写入文件（通常是 `.cso`）
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.as_bytes())?;
        Ok(())
    }

    /// 管线状态对象使用的 `(pointer, size)` 描述
    ///
    /// 返回值借用了本对象的内存，必须在 `CompiledShader` 存活期间使用。
    #[cfg(target_os = "windows")]
    pub fn bytecode(&self) -> windows::Win32::Graphics::Direct3D12::D3D12_SHADER_BYTECODE {
        windows::Win32::Graphics::Direct3D12::D3D12_SHADER_BYTECODE {
            pShaderBytecode: self.as_ptr() as *const std::ffi::c_void,
            BytecodeLength: self.len(),
        }
    }
}

impl fmt::Debug for CompiledShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledShader")
            .field("origin", &self.origin)
            .field("len", &self.len())
            .finish()
    }
}

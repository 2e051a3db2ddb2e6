//! DXC 编译路径
//!
//! `DxcToolchain` 持有三个协作对象：`IDxcUtils`（读文件）、`IDxcCompiler3`（编译）
//! 和默认的 `IDxcIncludeHandler`。它们由上层显式创建一次，之后以只读方式被所有
//! `Shader` 共享，生命周期与创建者一致。
//!
//! `dxcompiler.dll` 在运行时通过 `libloading` 加载，找不到时返回
//! `ShaderError::ToolchainUnavailable`，而不是让进程在启动时失败。

use std::ffi::c_void;
use std::path::Path;

use libloading::{Library, Symbol};
use tracing::{debug, info};
use windows::core::{Interface, GUID, HRESULT, HSTRING, PCWSTR};
use windows::Win32::Graphics::Direct3D::Dxc::*;

use super::{blob_bytes, blob_text};
use crate::core::error::{ShaderError, ShaderResult};
use crate::shader::{BinaryBlob, CompileOutput, ShaderToolchain};

/// 默认的 DXC 动态库名
pub const DXC_LIBRARY: &str = "dxcompiler.dll";

type CreateInstanceFn =
    unsafe extern "system" fn(rclsid: *const GUID, riid: *const GUID, ppv: *mut *mut c_void) -> HRESULT;

impl BinaryBlob for IDxcBlob {
    fn bytes(&self) -> &[u8] {
        unsafe { blob_bytes(self.GetBufferPointer(), self.GetBufferSize()) }
    }
}

impl BinaryBlob for IDxcBlobEncoding {
    fn bytes(&self) -> &[u8] {
        unsafe { blob_bytes(self.GetBufferPointer(), self.GetBufferSize()) }
    }
}

/// DXC 工具链
pub struct DxcToolchain {
    utils: IDxcUtils,
    compiler: IDxcCompiler3,
    include_handler: IDxcIncludeHandler,
    // 字段按声明顺序析构，DLL 在所有 COM 对象释放之后才卸载
    _library: Library,
}

impl DxcToolchain {
    /// 从默认的 `dxcompiler.dll` 创建
    pub fn new() -> ShaderResult<Self> {
        Self::from_library(DXC_LIBRARY)
    }

    /// 从指定的 DLL 创建
    pub fn from_library(library: &str) -> ShaderResult<Self> {
        let unavailable = |what: &str, e: windows::core::Error| {
            ShaderError::ToolchainUnavailable(format!("{}: {}", what, e))
        };

        let library_handle = unsafe { Library::new(library) }.map_err(|e| {
            ShaderError::ToolchainUnavailable(format!("failed to load {}: {}", library, e))
        })?;

        let create: CreateInstanceFn = {
            let symbol: Symbol<CreateInstanceFn> = unsafe { library_handle.get(b"DxcCreateInstance\0") }
                .map_err(|e| {
                    ShaderError::ToolchainUnavailable(format!("DxcCreateInstance not found in {}: {}", library, e))
                })?;
            *symbol
        };

        let utils: IDxcUtils = unsafe { create_instance(create, &CLSID_DxcUtils) }
            .map_err(|e| unavailable("DxcCreateInstance(CLSID_DxcUtils)", e))?;
        let compiler: IDxcCompiler3 = unsafe { create_instance(create, &CLSID_DxcCompiler) }
            .map_err(|e| unavailable("DxcCreateInstance(CLSID_DxcCompiler)", e))?;
        let include_handler = unsafe { utils.CreateDefaultIncludeHandler() }
            .map_err(|e| unavailable("IDxcUtils::CreateDefaultIncludeHandler", e))?;

        info!(library, "DXC toolchain created");
        Ok(Self { utils, compiler, include_handler, _library: library_handle })
    }
}

unsafe fn create_instance<T: Interface>(create: CreateInstanceFn, clsid: &GUID) -> windows::core::Result<T> {
    let mut object = std::ptr::null_mut();
    create(clsid, &T::IID, &mut object).ok()?;
    Ok(T::from_raw(object))
}

impl ShaderToolchain for DxcToolchain {
    type Source = IDxcBlobEncoding;

    fn load_source(&self, path: &Path) -> ShaderResult<IDxcBlobEncoding> {
        unsafe { self.utils.LoadFile(&HSTRING::from(path), None) }.map_err(|e| {
            ShaderError::SourceNotFound { path: path.to_path_buf(), reason: e.to_string() }
        })
    }

    fn compile(&self, source: &IDxcBlobEncoding, arguments: &[String]) -> ShaderResult<CompileOutput> {
        let bytes = source.bytes();
        let buffer = DxcBuffer {
            Ptr: bytes.as_ptr() as *const c_void,
            Size: bytes.len(),
            Encoding: DXC_CP_UTF8.0,
        };

        // PCWSTR 指向 wide 中的字符串，两者必须一起存活到 Compile 返回
        let wide: Vec<HSTRING> = arguments.iter().map(|a| HSTRING::from(a.as_str())).collect();
        let args: Vec<PCWSTR> = wide.iter().map(|a| PCWSTR(a.as_ptr())).collect();

        let result: IDxcResult = unsafe {
            self.compiler.Compile(&buffer, Some(args.as_slice()), &self.include_handler)
        }
        .map_err(|e| ShaderError::Invocation(format!("IDxcCompiler3::Compile failed: {}", e)))?;

        let status = unsafe { result.GetStatus() }
            .map_err(|e| ShaderError::Invocation(format!("IDxcResult::GetStatus failed: {}", e)))?;
        debug!(status = ?status, "DXC finished");

        // DXC_OUT_ERRORS
        let diagnostics = unsafe { result.GetErrorBuffer() }
            .map(|blob| blob_text(&blob))
            .unwrap_or_default();

        // DXC_OUT_OBJECT
        let object = if status.is_ok() {
            unsafe { result.GetResult() }
                .ok()
                .filter(|blob| !blob.bytes().is_empty())
                .map(|blob| Box::new(blob) as Box<dyn BinaryBlob>)
        } else {
            None
        };

        Ok(CompileOutput { diagnostics, object })
    }
}

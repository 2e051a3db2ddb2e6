//! 图形后端模块
//!
//! 本模块封装了系统着色器编译器的底层调用：
//! - DirectX 12：Windows 平台的 D3DCompiler 与 DXC
//! - 其它平台：占位实现，所有调用都返回 `ToolchainUnavailable`
//!
//! 具体编译器都实现了 `shader::backend` 中的 trait，
//! 包装层的逻辑不依赖任何平台 API。

#[cfg(target_os = "windows")]
pub mod dx12;
#[cfg(not(target_os = "windows"))]
pub mod unavailable;

use crate::core::error::ShaderResult;

/// 当前平台的 D3DCompiler 实现
#[cfg(target_os = "windows")]
pub type SystemLegacyCompiler = dx12::FxcCompiler;
/// 当前平台的 DXC 实现
#[cfg(target_os = "windows")]
pub type SystemToolchain = dx12::DxcToolchain;

#[cfg(not(target_os = "windows"))]
pub type SystemLegacyCompiler = unavailable::Unavailable;
#[cfg(not(target_os = "windows"))]
pub type SystemToolchain = unavailable::Unavailable;

/// 创建当前平台的 D3DCompiler
pub fn create_legacy_compiler() -> ShaderResult<SystemLegacyCompiler> {
    #[cfg(target_os = "windows")]
    {
        Ok(dx12::FxcCompiler::new())
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(unavailable::unavailable_error("D3DCompiler"))
    }
}

/// 创建当前平台的 DXC 工具链
pub fn create_toolchain() -> ShaderResult<SystemToolchain> {
    #[cfg(target_os = "windows")]
    {
        dx12::DxcToolchain::new()
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(unavailable::unavailable_error("DXC"))
    }
}

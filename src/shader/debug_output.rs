//! 编译器诊断输出
//!
//! 诊断文本同时写入进程调试输出（Windows 上为 `OutputDebugStringA`，
//! 可在调试器的输出窗口看到）和 `tracing` 日志。

use std::path::Path;

use tracing::{error, warn};

use crate::core::log::COMPILER_TARGET;

/// 输出编译错误
pub fn report_error(path: &Path, text: &str) {
    write_debug_string(text);
    error!(target: COMPILER_TARGET, path = %path.display(), "{}", text.trim_end());
}

/// 输出不影响结果的编译警告
pub fn report_warning(path: &Path, text: &str) {
    write_debug_string(text);
    warn!(target: COMPILER_TARGET, path = %path.display(), "{}", text.trim_end());
}

#[cfg(target_os = "windows")]
fn write_debug_string(text: &str) {
    use std::ffi::CString;
    use windows::core::PCSTR;
    use windows::Win32::System::Diagnostics::Debug::OutputDebugStringA;

    // 编译器输出中不会出现 NUL，出现时截断到第一个 NUL
    let text = text.split('\0').next().unwrap_or_default();
    if let Ok(message) = CString::new(text) {
        unsafe { OutputDebugStringA(PCSTR(message.as_ptr() as *const u8)) };
    }
}

#[cfg(not(target_os = "windows"))]
fn write_debug_string(_text: &str) {}

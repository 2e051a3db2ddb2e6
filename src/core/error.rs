//! 错误处理模块
//!
//! 定义了库中使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 手写 `Display` / `Error` / `From` 实现，不依赖派生宏
//! - 着色器错误区分三大类（工具链、加载、诊断），调用方可以据此决定
//!   重试、记录日志或替换为后备着色器
//! - 任何失败都通过 `Result` 返回，库内部不会终止进程

use std::fmt;
use std::path::PathBuf;

/// 库统一的 Result 类型
pub type Result<T> = std::result::Result<T, DxShaderError>;

/// 着色器编译相关操作的 Result 类型
pub type ShaderResult<T> = std::result::Result<T, ShaderError>;

/// dx_shader 的错误类型
#[derive(Debug)]
pub enum DxShaderError {
    /// 配置错误
    Config(ConfigError),

    /// 着色器编译错误
    Shader(ShaderError),

    /// IO 错误
    Io(std::io::Error),

    /// 日志系统错误
    Log(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 着色器编译错误
///
/// 每个变体都属于 [`ShaderErrorKind`] 中的一类，见 [`ShaderError::kind`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// 编译器不可用（DLL 缺失、实例创建失败等）
    ToolchainUnavailable(String),

    /// 编译器已启动，但调用本身失败（不是着色器源码的问题）
    Invocation(String),

    /// 参数无法传给编译器（例如包含 NUL 字符）
    InvalidArgument(String),

    /// 源文件不存在或无法读取
    SourceNotFound { path: PathBuf, reason: String },

    /// 编译器输出了诊断信息
    CompileDiagnostic { path: PathBuf, text: String },
}

/// 着色器错误的分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderErrorKind {
    /// 构建环境损坏，与着色器源码无关
    Toolchain,
    /// 源文件加载失败
    Load,
    /// 着色器源码本身有问题
    Diagnostic,
}

impl ShaderError {
    /// 返回错误所属的分类
    pub fn kind(&self) -> ShaderErrorKind {
        match self {
            ShaderError::ToolchainUnavailable(_)
            | ShaderError::Invocation(_)
            | ShaderError::InvalidArgument(_) => ShaderErrorKind::Toolchain,
            ShaderError::SourceNotFound { .. } => ShaderErrorKind::Load,
            ShaderError::CompileDiagnostic { .. } => ShaderErrorKind::Diagnostic,
        }
    }

    /// 编译器诊断文本（仅 `CompileDiagnostic` 有）
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            ShaderError::CompileDiagnostic { text, .. } => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for DxShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DxShaderError::Config(e) => write!(f, "Configuration error: {}", e),
            DxShaderError::Shader(e) => write!(f, "Shader error: {}", e),
            DxShaderError::Io(e) => write!(f, "IO error: {}", e),
            DxShaderError::Log(msg) => write!(f, "Log error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::ToolchainUnavailable(msg) => {
                write!(f, "Shader compiler unavailable: {}", msg)
            }
            ShaderError::Invocation(msg) => write!(f, "Shader compiler invocation failed: {}", msg),
            ShaderError::InvalidArgument(msg) => write!(f, "Invalid compiler argument: {}", msg),
            ShaderError::SourceNotFound { path, reason } => {
                write!(f, "Shader source not found: {} ({})", path.display(), reason)
            }
            ShaderError::CompileDiagnostic { path, text } => {
                write!(f, "Shader compilation failed for {}:\n{}", path.display(), text.trim_end())
            }
        }
    }
}

impl std::error::Error for DxShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DxShaderError::Io(e) => Some(e),
            DxShaderError::Config(e) => Some(e),
            DxShaderError::Shader(e) => Some(e),
            DxShaderError::Log(_) => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for ShaderError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for DxShaderError {
    fn from(err: std::io::Error) -> Self {
        DxShaderError::Io(err)
    }
}

impl From<ConfigError> for DxShaderError {
    fn from(err: ConfigError) -> Self {
        DxShaderError::Config(err)
    }
}

impl From<ShaderError> for DxShaderError {
    fn from(err: ShaderError) -> Self {
        DxShaderError::Shader(err)
    }
}

//! 配置管理模块
//!
//! 提供编译配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [shader]
//! entry_point = "main"
//! debug = true
//! skip_optimization = true
//! embed_debug = true
//! row_major = true
//! diagnostics = "strict"   # 或 "allow_warnings"
//!
//! [output]
//! directory = "build/shaders"
//!
//! [logging]
//! level = "info"           # trace, debug, info, warn, error
//! file_output = false
//!
//! [[jobs]]
//! path = "resources/shaders/TestVS.hlsl"
//! profile = "vs_6_0"
//! backend = "dxc"          # 或 "legacy"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 顶层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 编译选项
    #[serde(default)]
    pub shader: ShaderConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 需要编译的着色器列表
    #[serde(default = "default_jobs")]
    pub jobs: Vec<ShaderJob>,
}

/// 编译选项
///
/// 默认值与 DXC 参数 `-E main -Zi -Qembed_debug -Od -Zpr`
/// 以及 FXC 的 `D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION` 一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// 入口函数名
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// 生成调试信息
    #[serde(default = "default_true")]
    pub debug: bool,

    /// 关闭优化
    #[serde(default = "default_true")]
    pub skip_optimization: bool,

    /// 把调试信息嵌入输出（仅 DXC）
    #[serde(default = "default_true")]
    pub embed_debug: bool,

    /// 矩阵按行优先布局（仅 DXC）
    #[serde(default = "default_true")]
    pub row_major: bool,

    /// 诊断信息的处理策略
    #[serde(default)]
    pub diagnostics: DiagnosticsPolicy,
}

/// 诊断信息处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsPolicy {
    /// 只要编译器输出了任何诊断文本就视为失败
    #[default]
    Strict,
    /// 如果同时产生了目标代码，则诊断文本只作为警告记录
    AllowWarnings,
}

/// 编译后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerBackend {
    /// DXC（Shader Model 6.0 及以上）
    #[default]
    Dxc,
    /// D3DCompiler（FXC）
    Legacy,
}

/// 单个编译任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderJob {
    /// HLSL 源文件路径
    pub path: PathBuf,

    /// 着色器配置文件，如 `vs_6_0`
    pub profile: String,

    /// 使用的编译后端
    #[serde(default)]
    pub backend: CompilerBackend,
}

impl ShaderJob {
    /// 输出文件名 `<stem>.<profile>.cso`
    ///
    /// 同一源文件按不同 profile 编译时不会互相覆盖。
    pub fn output_file_name(&self) -> PathBuf {
        let stem = self.path.file_stem().unwrap_or(self.path.as_os_str());
        PathBuf::from(format!("{}.{}.cso", stem.to_string_lossy(), self.profile))
    }
}

/// 输出配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `.cso` 输出目录，为空时不写文件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_entry_point() -> String { "main".to_string() }
fn default_true() -> bool { true }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "dx_shader.log".to_string() }

fn default_jobs() -> Vec<ShaderJob> {
    vec![
        ShaderJob {
            path: PathBuf::from("resources/shaders/TestVS.hlsl"),
            profile: "vs_6_0".to_string(),
            backend: CompilerBackend::Dxc,
        },
        ShaderJob {
            path: PathBuf::from("resources/shaders/TestPS.hlsl"),
            profile: "ps_6_0".to_string(),
            backend: CompilerBackend::Dxc,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shader: ShaderConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            jobs: default_jobs(),
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            debug: true,
            skip_optimization: true,
            embed_debug: true,
            row_major: true,
            diagnostics: DiagnosticsPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 创建默认配置（包含默认的 VS/PS 编译任务）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无法解析则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_else(|_| Self::new())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 按命令行参数加载配置，返回配置及其来源路径
    ///
    /// 显式给出的 `--config <file>` 必须存在且能解析；
    /// 只有隐式的 [`DEFAULT_CONFIG_FILE`] 缺失或损坏时才回退到默认配置。
    pub fn load_from_args<I>(args: I) -> Result<(Self, PathBuf)>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        match args.iter().position(|a| a == "--config") {
            Some(idx) => {
                let path = args.get(idx + 1).map(PathBuf::from).ok_or_else(|| {
                    ConfigError::InvalidValue {
                        field: "--config".to_string(),
                        reason: "missing file path".to_string(),
                    }
                })?;
                let config = Self::from_file(&path)?;
                Ok((config, path))
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                Ok((Self::from_file_or_default(&path), path))
            }
        }
    }

    /// 从命令行参数覆盖配置
    ///
    /// `args` 不包含程序名。支持的参数：
    /// - `--config <file>`: 已在加载阶段处理，这里跳过
    /// - `--legacy`: 所有任务改用 D3DCompiler
    /// - `--allow-warnings`: 诊断策略改为 `AllowWarnings`
    /// - `--out <dir>`: 设置 `.cso` 输出目录
    /// - `<file> <profile>`: 成对出现的位置参数，替换配置中的任务列表
    pub fn apply_args<I>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        let mut legacy = false;
        let mut positional = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--legacy" => legacy = true,
                "--allow-warnings" => self.shader.diagnostics = DiagnosticsPolicy::AllowWarnings,
                "--config" => {
                    iter.next();
                }
                "--out" => {
                    let dir = iter.next().ok_or_else(|| ConfigError::InvalidValue {
                        field: "--out".to_string(),
                        reason: "expected a directory".to_string(),
                    })?;
                    self.output.directory = Some(PathBuf::from(dir));
                }
                other if other.starts_with("--") => {
                    return Err(ConfigError::InvalidValue {
                        field: other.to_string(),
                        reason: "unknown option".to_string(),
                    }
                    .into());
                }
                other => positional.push(other.to_string()),
            }
        }

        if !positional.is_empty() {
            if positional.len() % 2 != 0 {
                return Err(ConfigError::InvalidValue {
                    field: "arguments".to_string(),
                    reason: "expected <file> <profile> pairs".to_string(),
                }
                .into());
            }
            self.jobs = positional
                .chunks(2)
                .map(|pair| ShaderJob {
                    path: PathBuf::from(&pair[0]),
                    profile: pair[1].clone(),
                    backend: CompilerBackend::Dxc,
                })
                .collect();
        }

        if legacy {
            for job in &mut self.jobs {
                job.backend = CompilerBackend::Legacy;
            }
        }

        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.shader.entry_point.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "shader.entry_point".to_string(),
                reason: "Entry point must not be empty".to_string(),
            }
            .into());
        }

        if self.jobs.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "jobs".to_string(),
                reason: "At least one shader job is required".to_string(),
            }
            .into());
        }

        if let Some(job) = self.jobs.iter().find(|job| job.profile.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "jobs.profile".to_string(),
                reason: format!("Missing profile for {}", job.path.display()),
            }
            .into());
        }

        Ok(())
    }
}

impl CompilerBackend {
    /// 获取后端名称
    pub fn name(&self) -> &'static str {
        match self {
            CompilerBackend::Dxc => "DXC",
            CompilerBackend::Legacy => "D3DCompiler",
        }
    }
}

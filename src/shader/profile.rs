//! 着色器配置文件（profile）解析
//!
//! 只用于日志提示，编译器收到的始终是调用方传入的原始字符串。

use std::fmt;

/// 可编程着色器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
    Geometry,
    Hull,
    Domain,
    Compute,
    Library,
    Mesh,
    Amplification,
}

impl ShaderStage {
    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "vs" => ShaderStage::Vertex,
            "ps" => ShaderStage::Pixel,
            "gs" => ShaderStage::Geometry,
            "hs" => ShaderStage::Hull,
            "ds" => ShaderStage::Domain,
            "cs" => ShaderStage::Compute,
            "lib" => ShaderStage::Library,
            "ms" => ShaderStage::Mesh,
            "as" => ShaderStage::Amplification,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Hull => "hull",
            ShaderStage::Domain => "domain",
            ShaderStage::Compute => "compute",
            ShaderStage::Library => "library",
            ShaderStage::Mesh => "mesh",
            ShaderStage::Amplification => "amplification",
        }
    }
}

/// 解析后的 profile，例如 `vs_6_0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderProfile {
    pub stage: ShaderStage,
    pub major: u32,
    pub minor: u32,
}

impl ShaderProfile {
    /// 解析 `<stage>_<major>_<minor>`，无法识别时返回 `None`
    pub fn parse(profile: &str) -> Option<Self> {
        let mut parts = profile.trim().split('_');
        let stage = ShaderStage::from_prefix(parts.next()?)?;
        let major = parts.next()?.parse().ok()?;
        // FXC 的 4_0_level_9_x 之类的变体只取前两段版本号
        let minor = parts.next()?.parse().ok()?;
        Some(Self { stage, major, minor })
    }

    /// Shader Model 6.0 及以上只能由 DXC 编译
    pub fn requires_dxc(&self) -> bool {
        self.major >= 6
    }

    /// D3DCompiler 支持到 5.1
    pub fn supported_by_legacy(&self) -> bool {
        !self.requires_dxc()
    }
}

impl fmt::Display for ShaderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shader model {}.{}", self.stage.name(), self.major, self.minor)
    }
}

//! 按需创建的编译工具链
//!
//! DXC 实例的创建需要加载 `dxcompiler.dll`，只在第一次真正使用 DXC 路径时进行，
//! 之后所有 `Shader` 共享同一个实例。`LazyToolchain` 基于 `OnceCell`，不是 `Sync`，
//! 因此不可能被多个线程同时初始化。

use std::cell::OnceCell;
use std::path::Path;

use tracing::{debug, info};

use super::backend::{CompileOutput, ShaderToolchain};
use crate::core::error::ShaderResult;

/// 第一次使用时才调用 `factory` 创建工具链
///
/// 创建失败时错误直接返回给调用方，下一次使用会重新尝试。
pub struct LazyToolchain<T, F> {
    cell: OnceCell<T>,
    factory: F,
}

impl<T, F> LazyToolchain<T, F>
where
    F: Fn() -> ShaderResult<T>,
{
    pub fn new(factory: F) -> Self {
        Self { cell: OnceCell::new(), factory }
    }

    /// 获取工具链，必要时创建
    pub fn get(&self) -> ShaderResult<&T> {
        if let Some(toolchain) = self.cell.get() {
            return Ok(toolchain);
        }

        debug!("Creating shader toolchain on first use");
        let toolchain = (self.factory)()?;
        info!("Shader toolchain initialized");
        Ok(self.cell.get_or_init(|| toolchain))
    }

    /// 是否已经创建
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T, F> ShaderToolchain for LazyToolchain<T, F>
where
    T: ShaderToolchain,
    F: Fn() -> ShaderResult<T>,
{
    type Source = T::Source;

    fn load_source(&self, path: &Path) -> ShaderResult<Self::Source> {
        self.get()?.load_source(path)
    }

    fn compile(&self, source: &Self::Source, arguments: &[String]) -> ShaderResult<CompileOutput> {
        self.get()?.compile(source, arguments)
    }
}

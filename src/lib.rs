//! dx_shader - DirectX 12 着色器编译包装
//!
//! 把磁盘上的 HLSL 文件编译为管线状态对象可以直接使用的字节码，
//! 支持 D3DCompiler（FXC）与 DXC 两条编译路径。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `shader`: 编译包装、编译产物、编译选项与后端接口
//! - `gfx`: 系统编译器的具体实现（Windows）
//!
//! # 使用示例
//!
//! ```no_run
//! use dx_shader::gfx;
//! use dx_shader::shader::{LazyToolchain, Shader};
//!
//! let toolchain = LazyToolchain::new(gfx::create_toolchain);
//!
//! let mut vs = Shader::new();
//! match vs.load_with_toolchain(&toolchain, "resources/shaders/TestVS.hlsl", "vs_6_0") {
//!     Ok(binary) => println!("{} bytes", binary.len()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

pub mod core;
pub mod gfx;
pub mod shader;

//! dx_shader - 着色器编译命令行工具
//!
//! 按配置编译一组 HLSL 文件，默认与演示程序相同：
//! `TestVS.hlsl`（`vs_6_0`）和 `TestPS.hlsl`（`ps_6_0`），均使用 DXC。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件（config.toml）
//! cargo run
//!
//! # 指定文件与 profile，并输出 .cso
//! cargo run -- --out build/shaders resources/shaders/triangle.hlsl vs_6_0
//!
//! # 使用 D3DCompiler
//! cargo run -- --legacy resources/shaders/triangle.hlsl vs_5_0
//! ```
//!
//! # 命令行参数
//!
//! - `--config <file>`: 配置文件路径（默认 `config.toml`，显式指定时必须存在且有效）
//! - `--legacy`: 所有任务使用 D3DCompiler
//! - `--allow-warnings`: DXC 产生目标代码时把诊断信息当作警告
//! - `--out <dir>`: 把字节码写入 `<dir>/<stem>.<profile>.cso`
//! - `<file> <profile>`: 替换配置中的任务列表

use anyhow::Context;
use tracing::{error, info};

use dx_shader::core::{log, CompilerBackend, Config, ShaderJob, ShaderResult};
use dx_shader::gfx::{self, SystemToolchain};
use dx_shader::shader::{CompileOptions, CompiledShader, LazyToolchain, Shader};

type Toolchain = LazyToolchain<SystemToolchain, fn() -> ShaderResult<SystemToolchain>>;

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载配置文件
/// 2. 应用命令行参数覆盖
/// 3. 初始化日志系统
/// 4. 依次编译每个任务
fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // 1. 加载配置（在初始化日志之前）
    let (mut config, config_path) = match Config::load_from_args(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 2. 应用命令行参数并验证
    if let Err(e) = config.apply_args(&args).and_then(|_| config.validate()) {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // 3. 初始化日志系统
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    if let Err(e) = log::init_logger(config.logging.level, config.logging.file_output, log_file) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    info!(version = env!("CARGO_PKG_VERSION"), config = %config_path.display(), "dx_shader starting");

    // 4. 编译
    if let Err(e) = run(&config) {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let options = CompileOptions::from(&config.shader);

    if let Some(dir) = &config.output.directory {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    // DXC 只在第一个 DXC 任务出现时加载
    let toolchain: Toolchain = LazyToolchain::new(gfx::create_toolchain as fn() -> _);

    for job in &config.jobs {
        let mut shader = Shader::with_options(options.clone());
        let binary = compile_job(&toolchain, &mut shader, job)
            .with_context(|| format!("failed to compile {} ({})", job.path.display(), job.profile))?;

        info!(
            path = %job.path.display(),
            profile = %job.profile,
            backend = job.backend.name(),
            size = binary.len(),
            "Shader compiled"
        );

        if let Some(dir) = &config.output.directory {
            let out = dir.join(job.output_file_name());
            binary
                .write_to(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(output = %out.display(), "Bytecode written");
        }
    }

    info!(jobs = config.jobs.len(), "All shaders compiled");
    Ok(())
}

fn compile_job<'a>(
    toolchain: &Toolchain,
    shader: &'a mut Shader,
    job: &ShaderJob,
) -> ShaderResult<&'a CompiledShader> {
    match job.backend {
        CompilerBackend::Dxc => shader.load_with_toolchain(toolchain, &job.path, &job.profile),
        CompilerBackend::Legacy => {
            let compiler = gfx::create_legacy_compiler()?;
            shader.load_legacy(&compiler, &job.path, &job.profile)
        }
    }
}

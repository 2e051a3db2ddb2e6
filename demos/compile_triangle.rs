/// 三角形着色器编译示例
///
/// 演示如何用 dx_shader 的两条编译路径编译同一个 HLSL 文件，
/// 并取得管线状态对象需要的字节码。
///
/// 运行方式：
/// ```
/// cargo run --example compile_triangle
/// ```

use dx_shader::gfx;
use dx_shader::shader::{LazyToolchain, Shader};

fn main() {
    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== dx_shader 三角形编译示例 ===\n");

    let path = "resources/shaders/triangle.hlsl";
    let toolchain = LazyToolchain::new(gfx::create_toolchain);

    let mut shader = Shader::new();

    // DXC（Shader Model 6.0）
    println!("DXC: {} (vs_6_0)", path);
    match shader.load_with_toolchain(&toolchain, path, "vs_6_0") {
        Ok(binary) => {
            println!("  ✓ {} 字节", binary.len());
            #[cfg(target_os = "windows")]
            {
                let bytecode = binary.bytecode();
                println!("  D3D12_SHADER_BYTECODE.BytecodeLength = {}", bytecode.BytecodeLength);
            }
        }
        Err(e) => println!("  ✗ {}", e),
    }

    // D3DCompiler（Shader Model 5.0）
    println!("\nD3DCompiler: {} (vs_5_0)", path);
    match gfx::create_legacy_compiler() {
        Ok(compiler) => match shader.load_legacy(&compiler, path, "vs_5_0") {
            Ok(binary) => println!("  ✓ {} 字节", binary.len()),
            Err(e) => println!("  ✗ {}", e),
        },
        Err(e) => println!("  ✗ {}", e),
    }

    // 两条路径的产物互相独立
    println!("\n产物:");
    println!("  DXC:         {:?}", shader.toolchain_binary());
    println!("  D3DCompiler: {:?}", shader.legacy_binary());
}

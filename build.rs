/// Build script for dx_shader
///
/// # Shader Compilation Strategy:
/// - Shaders are compiled at runtime (D3DCompiler or DXC), never at build time
/// - The resource shaders are only tracked so that tests reading them rebuild on change
fn main() {
    println!("cargo:rerun-if-changed=resources/shaders/TestVS.hlsl");
    println!("cargo:rerun-if-changed=resources/shaders/TestPS.hlsl");
    println!("cargo:rerun-if-changed=resources/shaders/triangle.hlsl");
    println!("cargo:rerun-if-changed=resources/shaders/common.hlsli");
}

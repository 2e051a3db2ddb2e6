//! `Shader` 包装层的集成测试
//!
//! 使用假的编译后端驱动包装层，覆盖产物替换、诊断策略和加载失败等行为；
//! 真实编译器的测试只在 Windows 上编译，并且需要手动运行（`--ignored`）。

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use dx_shader::core::{DiagnosticsPolicy, ShaderError, ShaderErrorKind, ShaderResult};
use dx_shader::shader::{
    BinaryBlob, BinaryOrigin, CompileOptions, CompileOutput, LazyToolchain, LegacyCompiler, Shader,
    ShaderToolchain,
};

/// drop 时计数的 blob，用来确认旧产物被释放
struct TrackedBlob {
    bytes: Vec<u8>,
    drops: Rc<Cell<usize>>,
}

impl BinaryBlob for TrackedBlob {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for TrackedBlob {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// 假的 DXC：源码中含有 `@error` 时输出错误，含有 `@warning` 时输出警告并照常生成目标代码；
/// `@crash` 模拟编译器调用失败，`@empty` 模拟既无诊断也无目标代码的结果
#[derive(Default)]
struct FakeDxc {
    loads: Cell<usize>,
    compiles: Cell<usize>,
    last_arguments: RefCell<Vec<String>>,
    last_object_size: Cell<usize>,
    drops: Rc<Cell<usize>>,
}

impl ShaderToolchain for FakeDxc {
    type Source = String;

    fn load_source(&self, path: &Path) -> ShaderResult<String> {
        self.loads.set(self.loads.get() + 1);
        std::fs::read_to_string(path).map_err(|e| ShaderError::SourceNotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn compile(&self, source: &String, arguments: &[String]) -> ShaderResult<CompileOutput> {
        self.compiles.set(self.compiles.get() + 1);
        *self.last_arguments.borrow_mut() = arguments.to_vec();

        if source.contains("@crash") {
            return Err(ShaderError::Invocation("IDxcCompiler3::Compile failed: 0x80004005".to_string()));
        }
        if source.contains("@empty") {
            return Ok(CompileOutput { diagnostics: String::new(), object: None });
        }
        if source.contains("@error") {
            return Ok(CompileOutput::diagnostics(format!(
                "{}:1:1: error: expected unqualified-id\n",
                arguments[0]
            )));
        }

        let mut bytes = b"DXIL".to_vec();
        bytes.extend_from_slice(source.as_bytes());
        self.last_object_size.set(bytes.len());

        let diagnostics = if source.contains("@warning") {
            format!("{}:1:1: warning: implicit truncation of vector type\n", arguments[0])
        } else {
            String::new()
        };

        Ok(CompileOutput {
            diagnostics,
            object: Some(Box::new(TrackedBlob { bytes, drops: self.drops.clone() })),
        })
    }
}

/// 假的 D3DCompiler，标记与 `FakeDxc` 相同
#[derive(Default)]
struct FakeFxc {
    compiles: Cell<usize>,
    drops: Rc<Cell<usize>>,
}

impl LegacyCompiler for FakeFxc {
    fn compile_file(
        &self,
        path: &Path,
        entry_point: &str,
        profile: &str,
        _flags: u32,
    ) -> ShaderResult<CompileOutput> {
        self.compiles.set(self.compiles.get() + 1);
        let source = std::fs::read_to_string(path).expect("source checked by the wrapper");

        if source.contains("@crash") {
            return Err(ShaderError::Invocation("D3DCompileFromFile failed: 0x80004005".to_string()));
        }
        if source.contains("@empty") {
            return Ok(CompileOutput { diagnostics: String::new(), object: None });
        }
        if source.contains("@error") {
            return Ok(CompileOutput::diagnostics(format!(
                "{}(1,1): error X3000: syntax error: unexpected token '@'",
                path.display()
            )));
        }

        let bytes = format!("DXBC:{}:{}:{}", entry_point, profile, source.len()).into_bytes();
        Ok(CompileOutput::object(Box::new(TrackedBlob { bytes, drops: self.drops.clone() })))
    }
}

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const VALID_VS: &str = "float4 main(float4 pos : POSITION) : SV_POSITION { return pos; }\n";

fn triangle_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/shaders/triangle.hlsl")
}

#[test]
fn legacy_compile_leaves_toolchain_binary_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "TestVS.hlsl", VALID_VS);
    let fxc = FakeFxc::default();

    let mut shader = Shader::new();
    shader.load_legacy(&fxc, &path, "vs_5_0").unwrap();

    let binary = shader.legacy_binary().expect("legacy binary");
    assert!(binary.len() > 0);
    assert_eq!(binary.origin(), BinaryOrigin::Legacy);
    assert!(binary.as_bytes().starts_with(b"DXBC:main:vs_5_0"));
    assert!(shader.toolchain_binary().is_none());
}

#[test]
fn toolchain_compile_leaves_legacy_binary_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "TestPS.hlsl", VALID_VS);
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    shader.load_with_toolchain(&dxc, &path, "ps_6_0").unwrap();

    let binary = shader.toolchain_binary().expect("toolchain binary");
    assert!(!binary.is_empty());
    assert_eq!(binary.origin(), BinaryOrigin::Toolchain);
    assert!(shader.legacy_binary().is_none());
}

#[test]
fn both_paths_are_held_independently() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "TestVS.hlsl", VALID_VS);
    let fxc = FakeFxc::default();
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    shader.load_legacy(&fxc, &path, "vs_5_0").unwrap();
    shader.load_with_toolchain(&dxc, &path, "vs_6_0").unwrap();

    assert!(shader.legacy_binary().unwrap().as_bytes().starts_with(b"DXBC"));
    assert!(shader.toolchain_binary().unwrap().as_bytes().starts_with(b"DXIL"));
}

#[test]
fn toolchain_arguments_are_passed_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "TestVS.hlsl", VALID_VS);
    let dxc = FakeDxc::default();

    Shader::new().load_with_toolchain(&dxc, &path, "vs_6_0").unwrap();

    let expected: Vec<String> = [
        &*path.to_string_lossy(),
        "-E",
        "main",
        "-T",
        "vs_6_0",
        "-Zi",
        "-Qembed_debug",
        "-Od",
        "-Zpr",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(*dxc.last_arguments.borrow(), expected);
}

#[test]
fn recompiling_releases_the_previous_binary() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "TestVS.hlsl", VALID_VS);
    let dxc = FakeDxc::default();
    let fxc = FakeFxc::default();

    let mut shader = Shader::new();
    shader.load_with_toolchain(&dxc, &path, "vs_6_0").unwrap();
    assert_eq!(dxc.drops.get(), 0);

    shader.load_with_toolchain(&dxc, &path, "vs_6_1").unwrap();
    assert_eq!(dxc.drops.get(), 1);
    assert!(shader.toolchain_binary().is_some());

    shader.load_legacy(&fxc, &path, "vs_5_0").unwrap();
    shader.load_legacy(&fxc, &path, "vs_5_1").unwrap();
    assert_eq!(fxc.drops.get(), 1);

    drop(shader);
    assert_eq!(dxc.drops.get(), 2);
    assert_eq!(fxc.drops.get(), 2);
}

#[test]
fn syntax_error_reports_diagnostics_and_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_source(&dir, "good.hlsl", VALID_VS);
    let bad = write_source(&dir, "bad.hlsl", "@error float4 main( {\n");
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    shader.load_with_toolchain(&dxc, &good, "vs_6_0").unwrap();

    let err = shader.load_with_toolchain(&dxc, &bad, "vs_6_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Diagnostic);
    assert!(err.diagnostics().unwrap().contains("expected unqualified-id"));
    assert!(shader.toolchain_binary().is_none());
    // 之前成功的产物已被释放
    assert_eq!(dxc.drops.get(), 1);
}

#[test]
fn legacy_syntax_error_is_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_source(&dir, "bad.hlsl", "@error\n");
    let fxc = FakeFxc::default();

    let mut shader = Shader::new();
    let err = shader.load_legacy(&fxc, &bad, "vs_5_0").unwrap_err();
    assert!(matches!(err, ShaderError::CompileDiagnostic { .. }));
    assert!(err.to_string().contains("X3000"));
    assert!(shader.legacy_binary().is_none());
}

#[test]
fn warnings_are_fatal_under_strict_policy() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "warn.hlsl", "// @warning\nfloat4 main() : SV_TARGET { return 1; }\n");
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    let err = shader.load_with_toolchain(&dxc, &path, "ps_6_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Diagnostic);
    assert!(shader.toolchain_binary().is_none());
    // 产生的目标代码没有被保留
    assert_eq!(dxc.drops.get(), 1);
}

#[test]
fn warnings_are_accepted_when_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "warn.hlsl", "// @warning\nfloat4 main() : SV_TARGET { return 1; }\n");
    let dxc = FakeDxc::default();

    let options = CompileOptions {
        diagnostics: DiagnosticsPolicy::AllowWarnings,
        ..Default::default()
    };
    let mut shader = Shader::with_options(options);
    shader.load_with_toolchain(&dxc, &path, "ps_6_0").unwrap();
    assert!(shader.toolchain_binary().is_some());

    // 没有目标代码时仍然失败
    let bad = write_source(&dir, "bad.hlsl", "@error\n");
    assert!(shader.load_with_toolchain(&dxc, &bad, "ps_6_0").is_err());
}

#[test]
fn missing_source_fails_before_compiling() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does_not_exist.hlsl");
    let dxc = FakeDxc::default();
    let fxc = FakeFxc::default();

    let mut shader = Shader::new();

    let err = shader.load_with_toolchain(&dxc, &missing, "vs_6_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Load);
    assert_eq!(dxc.loads.get(), 0);
    assert_eq!(dxc.compiles.get(), 0);

    let err = shader.load_legacy(&fxc, &missing, "vs_5_0").unwrap_err();
    assert!(matches!(err, ShaderError::SourceNotFound { ref path, .. } if *path == missing));
    assert_eq!(fxc.compiles.get(), 0);

    assert!(shader.legacy_binary().is_none());
    assert!(shader.toolchain_binary().is_none());
}

#[test]
fn triangle_binary_size_matches_object_output() {
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    let size = shader.load_with_toolchain(&dxc, triangle_path(), "vs_6_0").unwrap().len();

    assert_eq!(size, dxc.last_object_size.get());
    assert_eq!(shader.toolchain_binary().unwrap().len(), size);
}

#[test]
fn lazy_toolchain_is_shared_across_shaders() {
    let created = Cell::new(0);
    let toolchain = LazyToolchain::new(|| {
        created.set(created.get() + 1);
        Ok(FakeDxc::default())
    });

    let vs_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/shaders/TestVS.hlsl");
    let ps_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/shaders/TestPS.hlsl");

    let mut vs = Shader::new();
    let mut ps = Shader::new();
    assert_eq!(created.get(), 0);

    vs.load_with_toolchain(&toolchain, &vs_path, "vs_6_0").unwrap();
    ps.load_with_toolchain(&toolchain, &ps_path, "ps_6_0").unwrap();
    vs.load_with_toolchain(&toolchain, &vs_path, "vs_6_0").unwrap();

    assert_eq!(created.get(), 1);
    assert_eq!(toolchain.get().unwrap().compiles.get(), 3);
}

#[test]
fn unavailable_toolchain_is_a_toolchain_error() {
    let toolchain: LazyToolchain<FakeDxc, _> = LazyToolchain::new(|| {
        Err(ShaderError::ToolchainUnavailable("dxcompiler.dll not found".to_string()))
    });

    let mut shader = Shader::new();
    let err = shader.load_with_toolchain(&toolchain, triangle_path(), "vs_6_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Toolchain);
    assert!(shader.toolchain_binary().is_none());
}

#[test]
fn toolchain_invocation_failure_is_a_toolchain_error() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_source(&dir, "good.hlsl", VALID_VS);
    let crash = write_source(&dir, "crash.hlsl", "// @crash\n");
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    shader.load_with_toolchain(&dxc, &good, "vs_6_0").unwrap();

    let err = shader.load_with_toolchain(&dxc, &crash, "vs_6_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Toolchain);
    assert!(matches!(err, ShaderError::Invocation(_)));
    assert!(shader.toolchain_binary().is_none());
    assert_eq!(dxc.drops.get(), 1);
}

#[test]
fn toolchain_result_without_object_or_diagnostics_is_a_toolchain_error() {
    let dir = tempfile::tempdir().unwrap();
    let empty = write_source(&dir, "empty.hlsl", "// @empty\n");
    let dxc = FakeDxc::default();

    let mut shader = Shader::new();
    let err = shader.load_with_toolchain(&dxc, &empty, "vs_6_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Toolchain);
    assert!(err.diagnostics().is_none());
    assert!(shader.toolchain_binary().is_none());
}

#[test]
fn legacy_invocation_failure_is_a_toolchain_error() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_source(&dir, "good.hlsl", VALID_VS);
    let crash = write_source(&dir, "crash.hlsl", "// @crash\n");
    let fxc = FakeFxc::default();

    let mut shader = Shader::new();
    shader.load_legacy(&fxc, &good, "vs_5_0").unwrap();

    let err = shader.load_legacy(&fxc, &crash, "vs_5_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Toolchain);
    assert!(shader.legacy_binary().is_none());
    assert_eq!(fxc.drops.get(), 1);
}

#[test]
fn legacy_result_without_object_or_diagnostics_is_a_toolchain_error() {
    let dir = tempfile::tempdir().unwrap();
    let empty = write_source(&dir, "empty.hlsl", "// @empty\n");
    let fxc = FakeFxc::default();

    let mut shader = Shader::new();
    let err = shader.load_legacy(&fxc, &empty, "vs_5_0").unwrap_err();
    assert_eq!(err.kind(), ShaderErrorKind::Toolchain);
    assert!(matches!(err, ShaderError::Invocation(_)));
    assert!(shader.legacy_binary().is_none());
}

#[cfg(target_os = "windows")]
mod system_compilers {
    //! 需要 `dxcompiler.dll` 与 `d3dcompiler_47.dll`：`cargo test -- --ignored`

    use super::*;
    use dx_shader::gfx::dx12::{DxcToolchain, FxcCompiler};

    #[test]
    #[ignore]
    fn dxc_compiles_triangle() {
        let toolchain = DxcToolchain::new().unwrap();
        let mut shader = Shader::new();
        let binary = shader.load_with_toolchain(&toolchain, triangle_path(), "vs_6_0").unwrap();

        assert!(binary.as_bytes().starts_with(b"DXBC"));
        assert_eq!(binary.bytecode().BytecodeLength, binary.len());
    }

    #[test]
    #[ignore]
    fn dxc_reports_syntax_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_source(&dir, "bad.hlsl", "float4 main( : SV_POSITION {\n");

        let toolchain = DxcToolchain::new().unwrap();
        let err = Shader::new().load_with_toolchain(&toolchain, &bad, "vs_6_0").unwrap_err();
        assert_eq!(err.kind(), ShaderErrorKind::Diagnostic);
    }

    #[test]
    #[ignore]
    fn fxc_compiles_triangle_with_include() {
        let mut shader = Shader::new();
        let binary = shader.load_legacy(&FxcCompiler::new(), triangle_path(), "vs_5_0").unwrap();
        assert!(binary.len() > 0);
        assert!(shader.toolchain_binary().is_none());
    }
}

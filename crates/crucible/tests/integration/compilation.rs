use crucible::{CompileRequest, CompileResult};

use super::{fixture_source, test_worker};

#[tokio::test]
async fn compile_c_hello_world() {
    let (worker, artifact_dir) = test_worker();
    let source = fixture_source("hello.c");
    let language = worker.config().get_language("c11").expect("c11 not found");

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: None,
        })
        .await;

    let artifact = result
        .artifact_path()
        .unwrap_or_else(|| panic!("expected Success, got {result:?}"));
    assert!(artifact.starts_with(artifact_dir.path()));

    let meta = std::fs::metadata(artifact).expect("artifact missing");
    assert!(meta.len() > 0);

    // The artifact is a runnable program
    let output = std::process::Command::new(artifact)
        .output()
        .expect("failed to run artifact");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, World!\n");
}

#[tokio::test]
async fn compile_cpp_hello_world() {
    let (worker, _artifact_dir) = test_worker();
    let source = fixture_source("hello.cpp");
    let language = worker
        .config()
        .get_language("cpp17")
        .expect("cpp17 not found");

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: None,
        })
        .await;

    assert!(result.is_success(), "expected Success, got {result:?}");
}

#[tokio::test]
async fn compile_with_gcc_default_standard() {
    let (worker, _artifact_dir) = test_worker();
    let source = fixture_source("hello.cpp");
    let language = worker
        .config()
        .get_language("gcc13")
        .expect("gcc13 not found");

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: None,
        })
        .await;

    assert!(result.is_success(), "expected Success, got {result:?}");
}

#[tokio::test]
async fn invalid_program_yields_diagnostics() {
    let (worker, _artifact_dir) = test_worker();
    let source = fixture_source("compile_error.cpp");
    let language = worker
        .config()
        .get_language("cpp17")
        .expect("cpp17 not found");

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: None,
        })
        .await;

    match result {
        CompileResult::CompileError { diagnostics } => {
            assert!(!diagnostics.is_empty());
            assert!(diagnostics.contains("error"), "diagnostics: {diagnostics}");
        }
        other => panic!("expected CompileError, got {other:?}"),
    }
}

#[tokio::test]
async fn garbage_input_never_panics() {
    let (worker, _artifact_dir) = test_worker();
    let language = worker.config().get_language("c11").expect("c11 not found");

    // Binary garbage including NULs; the toolchain must reject it and the
    // worker must come back with a normal result
    let source: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: None,
        })
        .await;

    assert!(
        matches!(result, CompileResult::CompileError { .. }),
        "expected CompileError, got {result:?}"
    );
}

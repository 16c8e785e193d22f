use crucible::CompileRequest;

use super::test_worker;

fn marker_program(marker: &str) -> Vec<u8> {
    format!("#include <stdio.h>\nint main() {{ puts(\"{marker}\"); return 0; }}\n").into_bytes()
}

#[tokio::test]
async fn concurrent_compiles_keep_their_own_results() {
    let (worker, _artifact_dir) = test_worker();
    let language = worker.config().get_language("c11").expect("c11 not found");

    let source_a = marker_program("job-alpha");
    let source_b = marker_program("job-beta");
    let source_c = marker_program("job-gamma");

    let (result_a, result_b, result_c) = tokio::join!(
        worker.compile(CompileRequest {
            source: &source_a,
            language,
            limits: None,
        }),
        worker.compile(CompileRequest {
            source: &source_b,
            language,
            limits: None,
        }),
        worker.compile(CompileRequest {
            source: &source_c,
            language,
            limits: None,
        }),
    );

    let artifacts = [
        (result_a.artifact_path().expect("job a failed"), "job-alpha"),
        (result_b.artifact_path().expect("job b failed"), "job-beta"),
        (result_c.artifact_path().expect("job c failed"), "job-gamma"),
    ];

    // All artifacts are distinct files
    assert_ne!(artifacts[0].0, artifacts[1].0);
    assert_ne!(artifacts[1].0, artifacts[2].0);
    assert_ne!(artifacts[0].0, artifacts[2].0);

    // Each artifact runs its own program, not a neighbor's
    for (path, marker) in artifacts {
        let output = std::process::Command::new(path)
            .output()
            .expect("failed to run artifact");
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), marker);
    }
}

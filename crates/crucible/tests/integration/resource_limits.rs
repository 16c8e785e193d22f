use std::time::{Duration, Instant};

use crucible::{CompileRequest, CompileResult, LimitKind, ResourceLimits};

use super::{fixture_source, test_worker};

#[tokio::test]
async fn cpu_limit_stops_heavy_compile() {
    let (worker, _artifact_dir) = test_worker();
    let source = fixture_source("heavy_compile.cpp");
    let language = worker
        .config()
        .get_language("cpp17")
        .expect("cpp17 not found");

    // Generous memory so the time limit is the one that trips
    let limits = ResourceLimits::none()
        .with_time_limit(0.3)
        .with_wall_time_limit(30.0)
        .with_memory_limit(4 * 1024 * 1024);

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: Some(&limits),
        })
        .await;

    assert!(
        matches!(
            result,
            CompileResult::ResourceExceeded {
                kind: LimitKind::Time
            }
        ),
        "expected time limit, got {result:?}"
    );
}

#[tokio::test]
async fn wall_clock_watchdog_stops_heavy_compile() {
    let (worker, _artifact_dir) = test_worker();
    let source = fixture_source("heavy_compile.cpp");
    let language = worker
        .config()
        .get_language("cpp17")
        .expect("cpp17 not found");

    let limits = ResourceLimits::none()
        .with_time_limit(30.0)
        .with_wall_time_limit(0.5)
        .with_memory_limit(4 * 1024 * 1024);

    let start = Instant::now();
    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: Some(&limits),
        })
        .await;

    // The call comes back promptly instead of hanging with the compiler
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(
        matches!(
            result,
            CompileResult::ResourceExceeded {
                kind: LimitKind::Time
            }
        ),
        "expected time limit, got {result:?}"
    );
}

#[tokio::test]
async fn output_limit_stops_artifact_write() {
    let (worker, _artifact_dir) = test_worker();
    let source = fixture_source("hello.cpp");
    let language = worker
        .config()
        .get_language("cpp17")
        .expect("cpp17 not found");

    // 4 KB is far below any linked binary
    let limits = ResourceLimits::none().with_max_output(4);

    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: Some(&limits),
        })
        .await;

    // Which stage trips the limit first (assembler output vs. final link)
    // varies by toolchain; any of them must surface as a blown limit,
    // never as Success
    assert!(
        matches!(result, CompileResult::ResourceExceeded { .. }),
        "expected ResourceExceeded, got {result:?}"
    );
}

#[tokio::test]
async fn oversized_source_is_rejected_up_front() {
    let (worker, _artifact_dir) = test_worker();
    let language = worker.config().get_language("c11").expect("c11 not found");

    let limit = worker.config().max_source_size;
    let source = vec![b'/'; limit + 1];

    let start = Instant::now();
    let result = worker
        .compile(CompileRequest {
            source: &source,
            language,
            limits: None,
        })
        .await;

    match result {
        CompileResult::InputTooLarge { size, limit: l } => {
            assert_eq!(size, limit + 1);
            assert_eq!(l, limit);
        }
        other => panic!("expected InputTooLarge, got {other:?}"),
    }
    // No compiler was launched for it
    assert!(start.elapsed() < Duration::from_secs(2));
}

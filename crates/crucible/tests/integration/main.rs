//! Integration tests for crucible
//!
//! These tests require a host C/C++ toolchain (gcc and g++ on PATH).
//! Run with: cargo test -p crucible --features integration-tests

#![cfg(feature = "integration-tests")]

use std::fs;

use crucible::{Config, Worker};
use tempfile::TempDir;

mod compilation;
mod concurrency;
mod config_loading;
mod resource_limits;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> Vec<u8> {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// A worker whose artifacts land in a per-test directory that is removed
/// when the returned guard drops.
pub(crate) fn test_worker() -> (Worker, TempDir) {
    let artifact_dir = tempfile::tempdir().expect("failed to create artifact dir");
    let config = Config {
        artifact_dir: Some(artifact_dir.path().to_path_buf()),
        ..Config::default()
    };
    (Worker::new(config), artifact_dir)
}

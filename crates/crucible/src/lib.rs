//! A library for sandboxed compilation of untrusted source code.
//!
//! Crucible is the compile stage of a judging pipeline: it takes a source
//! blob and a language, compiles it in an isolated per-job directory under
//! strict resource limits, and reports exactly one structured result. The
//! surrounding pipeline (submission intake, test execution, scoring) lives
//! elsewhere and calls this crate as a library.
//!
//! # Features
//!
//! - **Per-job isolation** — Every compile gets a fresh temporary directory,
//!   removed when the result is final; concurrent compiles never share state.
//! - **Resource limits** — CPU time, wall time, address space, stack, output
//!   file size, and open files, applied between fork and exec.
//! - **Structured results** — Compile errors and blown limits are data, not
//!   faults; environment trouble is reported separately for operators.
//! - **TOML configuration** — Per-language toolchain command templates and
//!   limit overrides.
//!
//! # Example
//!
//! ```rust,no_run
//! use crucible::{CompileRequest, Worker};
//!
//! # async fn run() {
//! let worker = Worker::with_defaults();
//! let language = worker.config().get_language("cpp17").unwrap();
//!
//! let result = worker
//!     .compile(CompileRequest {
//!         source: b"#include <cstdio>\nint main() { std::puts(\"hi\"); }",
//!         language,
//!         limits: None,
//!     })
//!     .await;
//!
//! if let Some(artifact) = result.artifact_path() {
//!     println!("compiled to {}", artifact.display());
//! }
//! # }
//! ```

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Language};
pub use sandbox::{
    ArtifactProbe, CompileJob, CompilerCommand, SandboxError, invoke, resolve_command,
};
pub use types::{LimitKind, ProcessOutcome, ResourceLimits};
pub use worker::{
    Classification, CompileRequest, CompileResult, Worker, WorkerError, classify,
};

pub mod config;
pub mod sandbox;
pub mod types;
pub mod worker;

//! Compile worker
//!
//! High-level orchestration: one call in, exactly one structured result out.
//! Expected outcomes (a rejected program, a blown limit, an oversized
//! submission) are data; only environment trouble is an error, and even that
//! is delivered inside the result rather than thrown at the caller.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use crate::worker::classify::{Classification, classify};

mod classify;
mod compile;

use crate::config::Config;
use crate::sandbox::SandboxError;
use crate::types::{LimitKind, ResourceLimits};

/// Request to compile one source submission
#[derive(Debug)]
pub struct CompileRequest<'a> {
    /// Source code to compile
    pub source: &'a [u8],
    /// Language configuration
    pub language: &'a crate::config::Language,
    /// Optional resource limit overrides for this request
    pub limits: Option<&'a ResourceLimits>,
}

/// Environment failures surfaced inside [`CompileResult::Internal`]
///
/// These mean the judge host is unhealthy, not that the submission is bad.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("language '{0}' does not define a compile step")]
    NotCompiled(String),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error("compiler exited 0 but produced no artifact")]
    MissingArtifact,

    #[error("compiler exited 0 but produced an empty artifact")]
    EmptyArtifact,

    #[error("compiler killed by unexpected signal {0}")]
    UnexpectedSignal(i32),

    #[error("compiler terminated without exit status or signal")]
    StatusUnavailable,
}

impl WorkerError {
    /// Whether this error came from host filesystem I/O, as opposed to a
    /// misbehaving toolchain. Lets operators triage disk trouble separately.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            WorkerError::Sandbox(
                SandboxError::Io(_)
                    | SandboxError::CreateDir(_)
                    | SandboxError::RemoveDir { .. }
                    | SandboxError::PersistArtifact(_)
            )
        )
    }
}

/// Outcome of one compile request
///
/// Exactly one variant is produced per request, whatever happens.
#[derive(Debug)]
pub enum CompileResult {
    /// The toolchain produced a runnable artifact.
    ///
    /// The artifact has been persisted outside the (already removed) job
    /// directory; the caller owns the file and deletes it when done.
    Success { artifact_path: PathBuf },

    /// The toolchain rejected the source. Routine; diagnostics go back to
    /// the submitter verbatim.
    CompileError { diagnostics: String },

    /// A resource limit cut the compilation short
    ResourceExceeded { kind: LimitKind },

    /// The submission exceeded the configured source size bound
    InputTooLarge { size: usize, limit: usize },

    /// The environment failed; operators should be alerted
    Internal { error: WorkerError },
}

impl CompileResult {
    /// Check if compilation produced an artifact
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, CompileResult::Success { .. })
    }

    /// Path to the persisted artifact, if compilation succeeded
    pub fn artifact_path(&self) -> Option<&Path> {
        match self {
            CompileResult::Success { artifact_path } => Some(artifact_path),
            _ => None,
        }
    }

    /// Compiler diagnostics, if the source was rejected
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            CompileResult::CompileError { diagnostics } => Some(diagnostics),
            _ => None,
        }
    }

    /// Whether this result should page an operator rather than the submitter
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileResult::Internal { .. })
    }
}

/// High-level compile worker
#[derive(Debug, Clone)]
pub struct Worker {
    config: Config,
}

impl Worker {
    /// Create a new worker with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a new worker with default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile one submission.
    ///
    /// Always returns exactly one [`CompileResult`]; never panics on
    /// malformed or adversarial input. The job directory is gone by the
    /// time this returns, success or failure alike. Dropping the returned
    /// future cancels the compile and kills the compiler's process group.
    pub async fn compile(&self, request: CompileRequest<'_>) -> CompileResult {
        compile::compile(&self.config, request).await
    }
}

//! Per-job compile sandbox
//!
//! This module owns the filesystem and process side of a compile attempt:
//! a fresh temporary job directory, the compiler command, and a supervised
//! child process with resource limits applied between fork and exec.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::sandbox::command::CompilerCommand;
pub use crate::sandbox::job::{ArtifactProbe, CompileJob};
pub use crate::sandbox::process::invoke;

mod command;
mod job;
mod process;

/// Errors that occur during sandbox operations
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("source exceeds maximum size: {size} bytes (limit {limit})")]
    SourceTooLarge { size: usize, limit: usize },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("empty compiler command")]
    EmptyCommand,

    #[error("compiler '{0}' not found in PATH")]
    CompilerNotFound(String),

    #[error("failed to create job directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("failed to remove job directory {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn compiler process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed waiting for compiler process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("failed to persist artifact: {0}")]
    PersistArtifact(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve the program in a command to an absolute path using the host's PATH.
///
/// The child process is spawned with a cleared environment, so PATH lookup
/// must happen in the parent before the spawn. Bare command names (like
/// `g++`) are resolved to their full path (like `/usr/bin/g++`) using the
/// host's PATH environment variable.
///
/// Commands that already contain a `/` (like `/usr/local/bin/gcc`) are left
/// unchanged.
pub fn resolve_command(command: &mut [String]) -> Result<(), SandboxError> {
    let first = match command.first_mut() {
        Some(first) => first,
        None => return Ok(()),
    };

    // Already an absolute or relative path
    if first.contains('/') {
        return Ok(());
    }

    let path_var = std::env::var("PATH").unwrap_or_default();
    for dir in path_var.split(':') {
        let candidate = std::path::Path::new(dir).join(&*first);
        if candidate.exists() {
            // Canonicalize to resolve symlinks so the spawned path does not
            // depend on symlink chains that may change under us.
            *first = std::fs::canonicalize(&candidate)
                .unwrap_or(candidate)
                .to_string_lossy()
                .into_owned();
            return Ok(());
        }
    }

    Err(SandboxError::CompilerNotFound(first.clone()))
}

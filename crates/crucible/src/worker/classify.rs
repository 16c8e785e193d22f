//! Outcome classification
//!
//! Maps a raw process outcome plus an artifact probe onto the result
//! taxonomy. Pure and deterministic: no I/O happens here, which is what
//! keeps the mapping table exhaustively testable.

use crate::sandbox::ArtifactProbe;
use crate::types::{LimitKind, ProcessOutcome};
use crate::worker::WorkerError;

/// Classifier verdict, one step short of a [`CompileResult`]
///
/// `Success` carries no path because persisting the artifact is the
/// orchestrator's side effect, not the classifier's.
///
/// [`CompileResult`]: crate::worker::CompileResult
#[derive(Debug)]
pub enum Classification {
    /// Artifact produced; orchestrator should persist it
    Success,
    /// Toolchain rejected the source
    CompileError { diagnostics: String },
    /// A resource limit was hit
    ResourceExceeded { kind: LimitKind },
    /// Toolchain or environment misbehaved
    Internal { error: WorkerError },
}

/// Classify a compiler outcome.
///
/// The order matters: the watchdog verdict wins over whatever status was
/// reaped from the killed process, and a zero exit status is only a success
/// when a non-empty artifact actually exists.
pub fn classify(outcome: &ProcessOutcome, artifact: ArtifactProbe) -> Classification {
    if outcome.timed_out {
        return Classification::ResourceExceeded {
            kind: LimitKind::Time,
        };
    }

    if let Some(signal) = outcome.signal {
        return match signal {
            libc::SIGXCPU => Classification::ResourceExceeded {
                kind: LimitKind::Time,
            },
            libc::SIGXFSZ => Classification::ResourceExceeded {
                kind: LimitKind::OutputSize,
            },
            _ => match LimitKind::from_diagnostics(&outcome.diagnostics) {
                Some(kind) => Classification::ResourceExceeded { kind },
                None => Classification::Internal {
                    error: WorkerError::UnexpectedSignal(signal),
                },
            },
        };
    }

    match outcome.exit_code {
        Some(0) => match artifact {
            ArtifactProbe::Present(_) => Classification::Success,
            ArtifactProbe::Empty => Classification::Internal {
                error: WorkerError::EmptyArtifact,
            },
            ArtifactProbe::Missing => Classification::Internal {
                error: WorkerError::MissingArtifact,
            },
        },
        Some(code) => {
            // Toolchain drivers report resource deaths of their
            // sub-processes as error text plus a non-zero exit.
            if let Some(kind) = LimitKind::from_diagnostics(&outcome.diagnostics) {
                Classification::ResourceExceeded { kind }
            } else if outcome.diagnostics.is_empty() {
                Classification::CompileError {
                    diagnostics: format!("compiler exited with status {code}"),
                }
            } else {
                Classification::CompileError {
                    diagnostics: outcome.diagnostics.clone(),
                }
            }
        }
        None => Classification::Internal {
            error: WorkerError::StatusUnavailable,
        },
    }
}

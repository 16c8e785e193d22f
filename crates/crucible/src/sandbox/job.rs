//! Job directory lifecycle
//!
//! Each compile attempt gets its own freshly created temporary directory.
//! The source file is written into it, the compiler runs inside it, and the
//! whole directory is removed when the job is finished. Nothing is ever
//! shared between jobs.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::sandbox::SandboxError;

/// What the orchestrator found at the expected artifact path after the
/// compiler exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactProbe {
    /// Artifact exists with the given non-zero size in bytes
    Present(u64),
    /// Artifact exists but is zero-sized
    Empty,
    /// Artifact does not exist
    Missing,
}

/// An isolated working directory for one compile attempt
///
/// The directory is created fresh per job and removed on [`finish`](Self::finish)
/// or, failing that, when the job is dropped. Paths handed out by
/// [`file_path`](Self::file_path) never escape the job directory.
#[derive(Debug)]
pub struct CompileJob {
    dir: tempfile::TempDir,
}

impl CompileJob {
    /// Create a new job with a fresh temporary directory
    pub fn create() -> Result<Self, SandboxError> {
        let dir = tempfile::Builder::new()
            .prefix("crucible-job-")
            .tempdir()
            .map_err(SandboxError::CreateDir)?;

        debug!(path = %dir.path().display(), "created job directory");
        Ok(Self { dir })
    }

    /// Get the path to the job directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the path to a file inside the job directory
    ///
    /// Returns an error if the name contains path traversal attempts.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, SandboxError> {
        if name.is_empty() || name.contains("..") || name.starts_with('/') {
            return Err(SandboxError::InvalidPath(format!(
                "path traversal not allowed: {name}"
            )));
        }
        Ok(self.dir.path().join(name))
    }

    /// Write the submitted source into the job directory.
    ///
    /// The source is a byte slice, not a string: submissions may legally
    /// contain embedded NUL bytes and all `source.len()` bytes are written.
    /// Input larger than `max_size` is rejected outright, never truncated.
    /// The file is created exclusively; a pre-existing file is an error.
    #[instrument(skip(self, source))]
    pub async fn write_source(
        &self,
        name: &str,
        source: &[u8],
        max_size: usize,
    ) -> Result<(), SandboxError> {
        if source.len() > max_size {
            return Err(SandboxError::SourceTooLarge {
                size: source.len(),
                limit: max_size,
            });
        }

        let path = self.file_path(name)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(source).await?;
        file.flush().await?;

        debug!(?path, len = source.len(), "wrote source file");
        Ok(())
    }

    /// Probe the artifact the compiler was asked to produce
    pub async fn probe_artifact(&self, name: &str) -> Result<ArtifactProbe, SandboxError> {
        let path = self.file_path(name)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > 0 => Ok(ArtifactProbe::Present(meta.len())),
            Ok(_) => Ok(ArtifactProbe::Empty),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ArtifactProbe::Missing),
            Err(e) => Err(SandboxError::Io(e)),
        }
    }

    /// Move the artifact out of the job directory so the directory can be
    /// removed while the caller keeps the binary.
    ///
    /// The artifact is copied to a uniquely named file in `dest_dir`, marked
    /// executable, and kept. The caller owns the returned path and is
    /// responsible for deleting it once the execution stage is done with it.
    #[instrument(skip(self))]
    pub async fn persist_artifact(
        &self,
        name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, SandboxError> {
        let src = self.file_path(name)?;

        let dest = tempfile::Builder::new()
            .prefix("crucible-artifact-")
            .tempfile_in(dest_dir)
            .map_err(|e| SandboxError::PersistArtifact(e.to_string()))?
            .into_temp_path();

        tokio::fs::copy(&src, &dest).await?;
        tokio::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).await?;

        let path = dest
            .keep()
            .map_err(|e| SandboxError::PersistArtifact(e.to_string()))?;

        debug!(artifact = %path.display(), "persisted artifact");
        Ok(path)
    }

    /// Remove the job directory.
    ///
    /// Dropping the job also removes the directory best-effort; `finish`
    /// surfaces the error instead of swallowing it, so the orchestrator can
    /// report a leaked directory.
    pub fn finish(self) -> Result<(), SandboxError> {
        let path = self.dir.path().to_path_buf();
        debug!(path = %path.display(), "removing job directory");
        self.dir
            .close()
            .map_err(|source| SandboxError::RemoveDir { path, source })
    }
}

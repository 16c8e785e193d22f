//! Compiler process supervision
//!
//! Spawns the compiler as a direct child (no shell), applies resource limits
//! between fork and exec, watches the wall clock, and captures bounded
//! diagnostics. The child is placed in its own process group so the whole
//! compiler pipeline (driver, cc1, assembler, linker) can be killed at once.

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::sandbox::{CompilerCommand, SandboxError};
use crate::types::{ProcessOutcome, ResourceLimits};

/// Kill switch for the compiler's process group.
///
/// Fires on drop, so a cancelled `invoke` future still takes the whole
/// process group down with it; no compiler outlives its result.
struct GroupGuard {
    pgid: Option<i32>,
}

impl GroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.map(|p| p as i32),
        }
    }

    fn kill_group(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            // Best effort; the group may already be gone
            let _ = unsafe { libc::killpg(pgid, libc::SIGKILL) };
        }
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        self.kill_group();
    }
}

fn set_rlimit(resource: libc::__rlimit_resource_t, soft: u64, hard: u64) -> std::io::Result<()> {
    let limit = libc::rlimit {
        rlim_cur: soft as libc::rlim_t,
        rlim_max: hard as libc::rlim_t,
    };
    if unsafe { libc::setrlimit(resource, &limit) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Applied in the child between fork and exec. Only async-signal-safe
/// syscalls are allowed here.
fn apply_limits(limits: &ResourceLimits) -> std::io::Result<()> {
    // New session and process group, so killpg reaches every sub-process
    if unsafe { libc::setsid() } == -1 {
        return Err(std::io::Error::last_os_error());
    }

    if let Some(seconds) = limits.time_limit {
        // Soft limit delivers SIGXCPU; the hard limit one second later is
        // the kernel's SIGKILL backstop.
        let soft = seconds.ceil() as u64;
        set_rlimit(libc::RLIMIT_CPU, soft, soft + 1)?;
    }
    if let Some(kb) = limits.memory_limit {
        set_rlimit(libc::RLIMIT_AS, kb * 1024, kb * 1024)?;
    }
    if let Some(kb) = limits.stack_limit {
        set_rlimit(libc::RLIMIT_STACK, kb * 1024, kb * 1024)?;
    }
    if let Some(kb) = limits.max_output {
        set_rlimit(libc::RLIMIT_FSIZE, kb * 1024, kb * 1024)?;
    }
    if let Some(count) = limits.max_open_files {
        set_rlimit(libc::RLIMIT_NOFILE, count as u64, count as u64)?;
    }
    set_rlimit(libc::RLIMIT_CORE, 0, 0)?;

    Ok(())
}

/// Read a stream to EOF, keeping at most `cap` bytes.
///
/// The stream is always drained completely so the child never blocks on a
/// full pipe; bytes past the cap are discarded and flagged as truncated.
async fn read_capped<R: AsyncRead + Unpin>(reader: Option<R>, cap: usize) -> (Vec<u8>, bool) {
    let Some(mut reader) = reader else {
        return (Vec::new(), false);
    };

    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() < cap {
                    let take = n.min(cap - buf.len());
                    buf.extend_from_slice(&chunk[..take]);
                    if take < n {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
            Err(_) => break,
        }
    }

    (buf, truncated)
}

fn combine_streams(stdout: (Vec<u8>, bool), stderr: (Vec<u8>, bool)) -> (String, bool) {
    let (out, out_truncated) = stdout;
    let (err, err_truncated) = stderr;

    let mut text = String::new();
    if !out.is_empty() {
        text.push_str(&String::from_utf8_lossy(&out));
    }
    if !err.is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&String::from_utf8_lossy(&err));
    }

    (text, out_truncated || err_truncated)
}

/// Run a compiler command to completion under its resource limits.
///
/// Returns the raw process outcome; mapping it to a compile result is the
/// classifier's job. A spawn failure is an error, never a fake success.
#[instrument(skip(command))]
pub async fn invoke(
    command: &CompilerCommand,
    max_diagnostics: usize,
) -> Result<ProcessOutcome, SandboxError> {
    let limits = command.limit_set().clone();
    let wall_limit = limits.wall_time_limit.map(Duration::from_secs_f64);

    let mut cmd = Command::new(command.program());
    cmd.args(command.arg_slice())
        .current_dir(command.working_dir())
        .env_clear()
        .envs(command.env_map())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    unsafe {
        cmd.pre_exec(move || apply_limits(&limits));
    }

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(SandboxError::Spawn)?;
    let mut guard = GroupGuard::new(child.id());

    debug!(program = %command.program().display(), pid = ?child.id(), "spawned compiler");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let capture = tokio::spawn(async move {
        let (out, err) = tokio::join!(
            read_capped(stdout, max_diagnostics),
            read_capped(stderr, max_diagnostics),
        );
        combine_streams(out, err)
    });

    let (status, timed_out) = match wall_limit {
        Some(wall) => match timeout(wall, child.wait()).await {
            Ok(status) => (status.map_err(SandboxError::Wait)?, false),
            Err(_) => {
                warn!(
                    wall_seconds = wall.as_secs_f64(),
                    "wall-clock watchdog fired, killing process group"
                );
                guard.kill_group();
                (child.wait().await.map_err(SandboxError::Wait)?, true)
            }
        },
        None => (child.wait().await.map_err(SandboxError::Wait)?, false),
    };

    // Sweep stray sub-processes the compiler may have left behind
    guard.kill_group();

    let (diagnostics, diagnostics_truncated) = capture.await.unwrap_or_default();

    let outcome = ProcessOutcome {
        exit_code: status.code(),
        signal: status.signal(),
        wall_time: start.elapsed().as_secs_f64(),
        timed_out,
        diagnostics,
        diagnostics_truncated,
    };

    debug!(
        exit_code = ?outcome.exit_code,
        signal = ?outcome.signal,
        wall_time = outcome.wall_time,
        timed_out,
        "compiler finished"
    );

    Ok(outcome)
}

//! Compilation pipeline
//!
//! One request flows through: write source → invoke compiler → probe
//! artifact → classify → persist on success → tear the job directory down.
//! Every exit path, early or late, ends with the job directory removed.

use tracing::{debug, instrument, warn};

use crate::config::{Config, DEFAULT_TOOL_PATH, Language};
use crate::sandbox::{
    CompileJob, CompilerCommand, SandboxError, invoke, resolve_command,
};
use crate::worker::classify::{Classification, classify};
use crate::worker::{CompileRequest, CompileResult, WorkerError};

/// Compile one submission. Always produces exactly one result.
#[instrument(skip(config, request), fields(language = %request.language.name))]
pub(crate) async fn compile(config: &Config, request: CompileRequest<'_>) -> CompileResult {
    match run_job(config, &request).await {
        Ok(result) => result,
        Err(error) => {
            warn!(%error, "compile job failed");
            CompileResult::Internal { error }
        }
    }
}

async fn run_job(
    config: &Config,
    request: &CompileRequest<'_>,
) -> Result<CompileResult, WorkerError> {
    let language = request.language;
    let compile_config = language
        .compile
        .as_ref()
        .ok_or_else(|| WorkerError::NotCompiled(language.name.clone()))?;

    let job = CompileJob::create()?;

    match job
        .write_source(
            &compile_config.source_name,
            request.source,
            config.max_source_size,
        )
        .await
    {
        Ok(()) => {}
        Err(SandboxError::SourceTooLarge { size, limit }) => {
            // No compile attempt for oversized input; `job` tears the
            // directory down on drop.
            return Ok(CompileResult::InputTooLarge { size, limit });
        }
        Err(e) => return Err(e.into()),
    }

    // Limit layering: config defaults ← language limits ← request limits
    let mut limits = config.effective_limits(compile_config.limits.as_ref());
    if let Some(request_limits) = request.limits {
        limits = limits.with_overrides(request_limits);
    }

    let mut argv = Language::expand_command(
        &compile_config.command,
        &compile_config.source_name,
        &compile_config.output_name,
    );
    resolve_command(&mut argv)?;

    let mut command = CompilerCommand::from_argv(argv, job.path())?
        .limits(limits)
        .env("PATH", DEFAULT_TOOL_PATH);
    for (key, value) in &compile_config.env {
        command = command.env(key, value);
    }

    let outcome = invoke(&command, config.max_diagnostics_bytes).await?;
    let artifact = job.probe_artifact(&compile_config.output_name).await?;

    debug!(
        exit_code = ?outcome.exit_code,
        signal = ?outcome.signal,
        timed_out = outcome.timed_out,
        ?artifact,
        "classifying compiler outcome"
    );

    let result = match classify(&outcome, artifact) {
        Classification::Success => {
            let artifact_path = job
                .persist_artifact(&compile_config.output_name, &config.artifact_dir())
                .await?;
            CompileResult::Success { artifact_path }
        }
        Classification::CompileError { diagnostics } => CompileResult::CompileError { diagnostics },
        Classification::ResourceExceeded { kind } => CompileResult::ResourceExceeded { kind },
        Classification::Internal { error } => CompileResult::Internal { error },
    };

    // A job directory that survives the result is a leak the caller must
    // hear about, so `finish` failures surface as Internal.
    job.finish()?;

    Ok(result)
}

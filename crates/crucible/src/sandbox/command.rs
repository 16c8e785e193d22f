//! Compiler command builder
//!
//! Collects everything needed to spawn a compiler: the program, its argument
//! vector, the working directory, the environment, and the resource limits.
//! The argument vector is passed to the kernel as-is; there is no shell in
//! the path, so source content can never be reinterpreted as shell syntax.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::sandbox::SandboxError;
use crate::types::ResourceLimits;

/// Builder for a single compiler invocation
#[derive(Debug, Clone)]
pub struct CompilerCommand {
    /// Program to execute (absolute path after `resolve_command`)
    program: PathBuf,
    /// Arguments, not including the program itself
    args: Vec<String>,
    /// Working directory (the job directory)
    working_dir: PathBuf,
    /// Environment for the child; nothing else is inherited
    env: HashMap<String, String>,
    /// Resource limits applied between fork and exec
    limits: ResourceLimits,
}

impl CompilerCommand {
    /// Create a new compiler command
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            env: HashMap::new(),
            limits: ResourceLimits::default(),
        }
    }

    /// Create a command from a full argument vector (program first)
    pub fn from_argv(
        argv: impl IntoIterator<Item = String>,
        working_dir: impl Into<PathBuf>,
    ) -> Result<Self, SandboxError> {
        let mut iter = argv.into_iter();
        let program = iter.next().ok_or(SandboxError::EmptyCommand)?;
        Ok(Self::new(program, working_dir).args(iter))
    }

    /// Add a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set resource limits
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the program path
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Get the argument vector (without the program)
    pub fn arg_slice(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Get the child environment
    pub fn env_map(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Get the resource limits
    pub fn limit_set(&self) -> &ResourceLimits {
        &self.limits
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// CPU time limit in seconds
    #[serde(default)]
    pub time_limit: Option<f64>,

    /// Wall clock time limit in seconds
    #[serde(default)]
    pub wall_time_limit: Option<f64>,

    /// Address space limit in kilobytes
    #[serde(default)]
    pub memory_limit: Option<u64>,

    /// Stack size limit in kilobytes
    #[serde(default)]
    pub stack_limit: Option<u64>,

    /// Maximum size of any file the compiler may write, in kilobytes
    #[serde(default)]
    pub max_output: Option<u64>,

    /// Maximum open files
    #[serde(default)]
    pub max_open_files: Option<u32>,
}

impl ResourceLimits {
    /// 1 kilobyte in kilobytes
    pub const KB: u64 = 1;
    /// 1 megabyte in kilobytes
    pub const MB: u64 = 1024;
    /// 1 gigabyte in kilobytes
    pub const GB: u64 = 1024 * 1024;

    /// Create new resource limits with all fields unset
    pub fn none() -> Self {
        Self {
            time_limit: None,
            wall_time_limit: None,
            memory_limit: None,
            stack_limit: None,
            max_output: None,
            max_open_files: None,
        }
    }

    /// Create new resource limits with the default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CPU time limit in seconds
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the wall clock time limit in seconds
    pub fn with_wall_time_limit(mut self, seconds: f64) -> Self {
        self.wall_time_limit = Some(seconds);
        self
    }

    /// Set the address space limit in kilobytes
    pub fn with_memory_limit(mut self, kb: u64) -> Self {
        self.memory_limit = Some(kb);
        self
    }

    /// Set the stack size limit in kilobytes
    pub fn with_stack_limit(mut self, kb: u64) -> Self {
        self.stack_limit = Some(kb);
        self
    }

    /// Set the maximum output file size in kilobytes
    pub fn with_max_output(mut self, kb: u64) -> Self {
        self.max_output = Some(kb);
        self
    }

    /// Set the maximum number of open files
    pub fn with_max_open_files(mut self, count: u32) -> Self {
        self.max_open_files = Some(count);
        self
    }

    /// Apply overrides from another ResourceLimits, preferring values from `overrides`
    ///
    /// Returns a new ResourceLimits with values from `overrides` taking precedence
    /// over values from `self` when both are present.
    pub fn with_overrides(&self, overrides: &ResourceLimits) -> ResourceLimits {
        ResourceLimits {
            time_limit: overrides.time_limit.or(self.time_limit),
            wall_time_limit: overrides.wall_time_limit.or(self.wall_time_limit),
            memory_limit: overrides.memory_limit.or(self.memory_limit),
            stack_limit: overrides.stack_limit.or(self.stack_limit),
            max_output: overrides.max_output.or(self.max_output),
            max_open_files: overrides.max_open_files.or(self.max_open_files),
        }
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            time_limit: Some(30.0),
            wall_time_limit: Some(60.0),
            memory_limit: Some(1024 * 1024), // 1 GB
            stack_limit: Some(262144),       // 256 MB
            max_output: Some(65536),         // 64 MB
            max_open_files: Some(128),
        }
    }
}

/// Which resource limit a compile ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitKind {
    /// CPU or wall-clock time limit exceeded
    #[serde(rename = "time")]
    Time,

    /// Memory limit exceeded
    #[serde(rename = "memory")]
    Memory,

    /// Output file size limit exceeded
    #[serde(rename = "output_size")]
    OutputSize,
}

impl LimitKind {
    /// Infer an exceeded limit from compiler diagnostics.
    ///
    /// Toolchain drivers report resource deaths of their sub-processes as
    /// ordinary error text and then exit non-zero (e.g. `gcc: internal
    /// compiler error: CPU time limit exceeded (program cc1plus)`), so the
    /// limit kind has to be recovered from the message.
    pub fn from_diagnostics(diagnostics: &str) -> Option<Self> {
        let msg = diagnostics.to_lowercase();

        if msg.contains("time limit exceeded") {
            Some(LimitKind::Time)
        } else if msg.contains("out of memory")
            || msg.contains("memory exhausted")
            || msg.contains("cannot allocate memory")
        {
            Some(LimitKind::Memory)
        } else if msg.contains("file size limit exceeded") || msg.contains("file too large") {
            Some(LimitKind::OutputSize)
        } else {
            None
        }
    }
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::Time => write!(f, "time"),
            LimitKind::Memory => write!(f, "memory"),
            LimitKind::OutputSize => write!(f, "output size"),
        }
    }
}

/// Raw outcome of one compiler invocation
///
/// Produced by the process supervisor, consumed by the result classifier.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// Exit code if the compiler exited normally
    pub exit_code: Option<i32>,

    /// Signal number if the compiler was killed by a signal
    pub signal: Option<i32>,

    /// Wall clock time used in seconds
    pub wall_time: f64,

    /// Whether the wall-clock watchdog fired and killed the process group
    pub timed_out: bool,

    /// Captured stdout/stderr of the compiler, bounded and lossily decoded
    pub diagnostics: String,

    /// Whether `diagnostics` was truncated at the capture bound
    pub diagnostics_truncated: bool,
}

impl ProcessOutcome {
    /// Check if the compiler exited normally with code 0
    #[must_use]
    pub fn exited_ok(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

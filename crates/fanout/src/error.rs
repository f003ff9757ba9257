//! Error types for remote command execution.
//!
//! Per-host failures are categorized so callers can tell a host that could
//! not be reached apart from a command that ran and failed. None of these
//! ever abort a batch; they are stored on the host's result.

use thiserror::Error;

/// Categories of per-host execution errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The local program (ssh or the shell) could not be started
    Launch,
    /// The transport could not reach or authenticate to the host
    Connection,
    /// The command ran and exited non-zero, or was killed
    Command,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Launch => "Could not start process",
            Self::Connection => "Host unreachable",
            Self::Command => "Command failed",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Launch => "Check that ssh and the local shell are installed and on PATH",
            Self::Connection => "Check the hostname, network, and ssh keys for this host",
            Self::Command => "See the command output above for details",
        }
    }
}

/// A classified failure on a single host.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The process could not be spawned at all
    #[error("error executing on {host}: failed to launch {program}: {source}")]
    Launch {
        /// Target host reference
        host: String,
        /// Program that failed to start
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// ssh reported a connection-level failure (exit status 255)
    #[error("error executing on {host}: host unreachable (ssh exit status {code})")]
    Unreachable {
        /// Target host reference
        host: String,
        /// Exit status returned by ssh
        code: i32,
    },

    /// The command exited with a non-zero status
    #[error("error executing on {host}: exit status {code}")]
    Exit {
        /// Target host reference
        host: String,
        /// Exit status
        code: i32,
    },

    /// The process was terminated by a signal
    #[error("error executing on {host}: terminated by signal")]
    Signaled {
        /// Target host reference
        host: String,
    },
}

impl ExecError {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Launch { .. } => ErrorCategory::Launch,
            Self::Unreachable { .. } => ErrorCategory::Connection,
            Self::Exit { .. } | Self::Signaled { .. } => ErrorCategory::Command,
        }
    }

    /// The host this error belongs to.
    pub fn host(&self) -> &str {
        match self {
            Self::Launch { host, .. }
            | Self::Unreachable { host, .. }
            | Self::Exit { host, .. }
            | Self::Signaled { host } => host,
        }
    }
}

/// Errors that stop an invocation before any host is contacted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Empty host list
    #[error("at least one hostname must be specified")]
    NoHosts,

    /// Blank command string
    #[error("command cannot be empty")]
    EmptyCommand,

    /// A host reference that is the empty string
    #[error("host reference at position {0} is empty")]
    EmptyHost(usize),

    /// The worker pool could not be created
    #[error("failed to create worker pool: {0}")]
    ThreadPool(String),

    /// A worker finished without filling its slot
    #[error("no result was recorded for {0}")]
    Incomplete(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

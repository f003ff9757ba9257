//! Per-host results and the ordered batch returned by the engine.

use crate::error::ExecError;
use thiserror::Error;

/// Outcome of running one command on one host.
///
/// Created once by a transport and never modified afterwards. A result can
/// carry both captured output and an error: a failing command often writes
/// its diagnostics before exiting.
#[derive(Debug)]
pub struct HostResult {
    hostname: String,
    command: String,
    stdout: String,
    stderr: String,
    error: Option<ExecError>,
}

impl HostResult {
    /// Create a result from captured output.
    pub fn new(
        hostname: impl Into<String>,
        command: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        error: Option<ExecError>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            command: command.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            error,
        }
    }

    /// Create a result for a terminal-attached run, which captures nothing.
    pub fn attached(
        hostname: impl Into<String>,
        command: impl Into<String>,
        error: Option<ExecError>,
    ) -> Self {
        Self::new(hostname, command, String::new(), String::new(), error)
    }

    /// Host reference this result belongs to.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Command string that was run.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Captured standard output.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured standard error.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// The classified failure, if any.
    pub fn error(&self) -> Option<&ExecError> {
        self.error.as_ref()
    }

    /// Whether the command succeeded on this host.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Results of one operation, index-aligned with the host list that
/// produced it: `batch[i]` is always the result for `hosts[i]`.
#[derive(Debug, Default)]
pub struct Batch {
    results: Vec<HostResult>,
}

impl Batch {
    pub(crate) fn from_results(results: Vec<HostResult>) -> Self {
        Self { results }
    }

    /// Results in host order.
    pub fn results(&self) -> &[HostResult] {
        &self.results
    }

    /// Iterate over results in host order.
    pub fn iter(&self) -> std::slice::Iter<'_, HostResult> {
        self.results.iter()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The first error in host order, if any host failed.
    pub fn first_error(&self) -> Option<&ExecError> {
        self.results.iter().find_map(HostResult::error)
    }

    /// Results that carry an error, in host order.
    pub fn failures(&self) -> impl Iterator<Item = &HostResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Whether every host succeeded.
    pub fn is_success(&self) -> bool {
        self.first_error().is_none()
    }

    /// Take ownership of the results.
    pub fn into_results(self) -> Vec<HostResult> {
        self.results
    }

    /// Turn the batch into an overall outcome.
    ///
    /// Every failed host is named in the error; the first failure in host
    /// order is kept as the source.
    pub fn into_result(self) -> std::result::Result<(), BatchError> {
        let total = self.results.len();
        let mut failed_hosts = Vec::new();
        let mut first = None;

        for result in self.results {
            if let Some(error) = result.error {
                failed_hosts.push(result.hostname);
                first.get_or_insert(error);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(BatchError {
                failed_hosts,
                total,
                first,
            }),
        }
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a HostResult;
    type IntoIter = std::slice::Iter<'a, HostResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::ops::Index<usize> for Batch {
    type Output = HostResult;

    fn index(&self, index: usize) -> &HostResult {
        &self.results[index]
    }
}

/// One or more hosts in a batch failed.
#[derive(Debug, Error)]
#[error("{} of {total} hosts failed: {}", .failed_hosts.len(), .failed_hosts.join(", "))]
pub struct BatchError {
    /// Failed hosts, in host order
    pub failed_hosts: Vec<String>,
    /// Number of hosts in the batch
    pub total: usize,
    /// First failure in host order
    #[source]
    pub first: ExecError,
}

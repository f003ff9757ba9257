//! Execution engine - fans one command out over a host list
//!
//! Each call to [`Engine::run`] is an independent run that moves through
//! dispatching and collecting before returning; nothing is kept between
//! calls. Whatever the mode, the returned [`Batch`] is index-aligned with the
//! host list.

use crate::error::{EngineError, Result};
use crate::result::{Batch, HostResult};
use crate::transport::Transport;
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

/// How a batch is executed. Chosen by the caller, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Captured output, one host at a time
    Sequential,
    /// Captured output, every host at once
    Parallel,
    /// Terminal attached, one host at a time
    Interactive,
}

impl ExecMode {
    /// Whether output is buffered rather than sent to the terminal.
    pub fn is_captured(&self) -> bool {
        !matches!(self, Self::Interactive)
    }
}

/// Receives progress notifications during a run.
///
/// In [`ExecMode::Parallel`] `host_finished` is called from worker threads,
/// one at a time, with a strictly increasing `completed` count.
pub trait Observer: Sync {
    /// Called once before any host is contacted
    fn batch_started(&self, _total: usize) {}

    /// Called before a host starts, in sequential and interactive modes
    fn host_started(&self, _host: &str, _command: &str) {}

    /// Called each time a host finishes
    fn host_finished(&self, _completed: usize, _total: usize, _result: &HostResult) {}

    /// Called once after every host has finished
    fn batch_finished(&self, _total: usize) {}
}

/// Observer that ignores every notification.
pub struct Silent;

impl Observer for Silent {}

/// Runs commands across hosts through a [`Transport`].
pub struct Engine<T> {
    transport: T,
}

impl<T: Transport> Engine<T> {
    /// Create an engine over a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `command` on every host under the given mode.
    ///
    /// Fails only before dispatch (empty host list, blank command, empty
    /// host reference, worker pool creation). Per-host failures are recorded
    /// in the batch and never stop sibling hosts.
    pub fn run(
        &self,
        hosts: &[String],
        command: &str,
        mode: ExecMode,
        observer: &dyn Observer,
    ) -> Result<Batch> {
        validate(hosts, command)?;

        log::debug!(
            "dispatching {:?} run on {} host(s): {}",
            mode,
            hosts.len(),
            command
        );
        observer.batch_started(hosts.len());

        let results = match mode {
            ExecMode::Sequential => self.run_sequential(hosts, command, observer),
            ExecMode::Parallel => self.run_parallel(hosts, command, observer)?,
            ExecMode::Interactive => self.run_interactive(hosts, command, observer),
        };

        observer.batch_finished(hosts.len());
        log::debug!(
            "{:?} run complete: {}/{} host(s) succeeded",
            mode,
            results.iter().filter(|r| r.is_success()).count(),
            results.len()
        );

        Ok(Batch::from_results(results))
    }

    fn run_sequential(
        &self,
        hosts: &[String],
        command: &str,
        observer: &dyn Observer,
    ) -> Vec<HostResult> {
        let total = hosts.len();
        let mut results = Vec::with_capacity(total);

        for (idx, host) in hosts.iter().enumerate() {
            observer.host_started(host, command);
            let result = self.transport.capture(host, command);
            observer.host_finished(idx + 1, total, &result);
            results.push(result);
        }

        results
    }

    /// One unit of work per host on a pool sized to the host list. Each unit
    /// owns exactly one slot, so the slot writes need no lock; only the
    /// completion counter is shared.
    fn run_parallel(
        &self,
        hosts: &[String],
        command: &str,
        observer: &dyn Observer,
    ) -> Result<Vec<HostResult>> {
        let total = hosts.len();
        let mut slots: Vec<Option<HostResult>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let completed = Mutex::new(0usize);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(total)
            .thread_name(|idx| format!("fanout-{idx}"))
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        pool.install(|| {
            slots
                .par_iter_mut()
                .zip(hosts.par_iter())
                .for_each(|(slot, host)| {
                    let result = self.transport.capture(host, command);
                    log::debug!("{host} finished (success: {})", result.is_success());

                    {
                        let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
                        *done += 1;
                        observer.host_finished(*done, total, &result);
                    }

                    *slot = Some(result);
                });
        });

        slots
            .into_iter()
            .zip(hosts)
            .map(|(slot, host)| slot.ok_or_else(|| EngineError::Incomplete(host.clone())))
            .collect()
    }

    /// Attached sessions never overlap: prompts such as a sudo password must
    /// be answerable by someone watching one session at a time.
    fn run_interactive(
        &self,
        hosts: &[String],
        command: &str,
        observer: &dyn Observer,
    ) -> Vec<HostResult> {
        let total = hosts.len();
        let mut results = Vec::with_capacity(total);

        for (idx, host) in hosts.iter().enumerate() {
            observer.host_started(host, command);
            let error = self.transport.attach(host, command).err();
            if let Some(error) = &error {
                log::debug!("{host} failed, continuing: {error}");
            }
            let result = HostResult::attached(host.as_str(), command, error);
            observer.host_finished(idx + 1, total, &result);
            results.push(result);
        }

        results
    }
}

fn validate(hosts: &[String], command: &str) -> Result<()> {
    if hosts.is_empty() {
        return Err(EngineError::NoHosts);
    }
    if command.trim().is_empty() {
        return Err(EngineError::EmptyCommand);
    }
    if let Some(idx) = hosts.iter().position(String::is_empty) {
        return Err(EngineError::EmptyHost(idx));
    }
    Ok(())
}

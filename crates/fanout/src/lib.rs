//! # fanout
//!
//! Run one shell command across a list of hosts and get the results back in
//! host order.
//!
//! ## Core Concepts
//!
//! - **Transport**: runs a command on one host, either captured or attached
//!   to the terminal. [`ShellTransport`] uses `ssh` for remote hosts and a
//!   local shell for the `localhost` sentinel.
//! - **Engine**: applies a transport across hosts under an [`ExecMode`].
//! - **Batch**: per-host results, always in the same order as the input.
//!
//! ## Example
//!
//! ```no_run
//! use fanout::{Engine, ExecMode, ShellTransport, Silent};
//!
//! let engine = Engine::new(ShellTransport::new());
//! let hosts = vec!["atlas".to_string(), "localhost".to_string()];
//!
//! let batch = engine.run(&hosts, "uptime", ExecMode::Parallel, &Silent)?;
//! for result in &batch {
//!     println!("{}: {}", result.hostname(), result.stdout().trim());
//! }
//! batch.into_result()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Failure Model
//!
//! A host that cannot be reached or whose command exits non-zero never stops
//! the others. Its [`HostResult`] carries an [`ExecError`] and the caller
//! decides afterwards, via [`Batch::first_error`] or [`Batch::into_result`],
//! whether the run as a whole failed.
//!
//! There is no timeout: a command that never returns holds up its batch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod result;
pub mod transport;

pub use engine::{Engine, ExecMode, Observer, Silent};
pub use error::{EngineError, ErrorCategory, ExecError, Result};
pub use result::{Batch, BatchError, HostResult};
pub use transport::{LOCALHOST, ShellTransport, Target, Transport};

use anyhow::{Context as _, Result};
use fanout::ExecMode;
use std::io::{self, Write};

use crate::Context;
use crate::cli::StatusArgs;
use crate::present;
use crate::probe::{self, StatusRow};
use crate::progress;

/// Probe every host in parallel and print one row per host.
///
/// Hosts that cannot be probed show up as `error` rows; they do not make the
/// command fail.
pub fn run(ctx: &Context, args: StatusArgs) -> Result<()> {
    let hosts = super::resolve_targets(ctx, &args.target.targets)?;
    let command = probe::compound_command(&ctx.settings.repo);

    // JSON output goes to pipes, keep the spinner off it
    let quiet = ctx.quiet || args.json;
    let observer = progress::parallel_observer("Checking status", hosts.len(), quiet, ctx.theme);
    let batch = ctx
        .engine()
        .run(&hosts, &command, ExecMode::Parallel, observer.as_ref())?;

    for failed in batch.failures() {
        if let Some(err) = failed.error() {
            log::warn!("{err}");
        }
    }

    let rows: Vec<StatusRow> = batch.iter().map(StatusRow::from).collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if args.json {
        present::write_status_json(&mut out, &rows)
    } else {
        present::write_status_table(&mut out, &ctx.theme, &rows)
    };
    written
        .and_then(|()| out.flush())
        .context("Could not write status")
}

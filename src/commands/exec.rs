use anyhow::Result;
use fanout::{ExecMode, Silent};

use crate::Context;
use crate::cli::ExecArgs;
use crate::present::TranscriptObserver;
use crate::progress;

/// Execution mode chosen by the `exec` flags; sequential unless asked otherwise.
fn mode_for(args: &ExecArgs) -> ExecMode {
    if args.interactive {
        ExecMode::Interactive
    } else if args.parallel {
        ExecMode::Parallel
    } else {
        ExecMode::Sequential
    }
}

pub fn run(ctx: &Context, args: ExecArgs) -> Result<()> {
    let hosts = super::resolve_targets(ctx, &args.targets)?;
    let command = args.command.join(" ");
    let mode = mode_for(&args);

    log::info!("Running {:?} on {} host(s): {}", mode, hosts.len(), command);
    run_command(ctx, &hosts, &command, mode, "Executing")
}

/// Run `command` on `hosts` and present the outcome the way `mode` calls for.
///
/// Captured modes print a transcript once the batch is complete; attached
/// runs print their headers as they go.
pub(crate) fn run_command(
    ctx: &Context,
    hosts: &[String],
    command: &str,
    mode: ExecMode,
    label: &str,
) -> Result<()> {
    let engine = ctx.engine();

    match mode {
        ExecMode::Interactive => {
            let observer = TranscriptObserver::new(ctx.theme);
            let batch = engine.run(hosts, command, mode, &observer)?;
            batch.into_result()?;
            Ok(())
        }
        ExecMode::Parallel => {
            let observer = progress::parallel_observer(label, hosts.len(), ctx.quiet, ctx.theme);
            let batch = engine.run(hosts, command, mode, observer.as_ref())?;
            super::report(ctx, batch)
        }
        ExecMode::Sequential => {
            let batch = engine.run(hosts, command, mode, &Silent)?;
            super::report(ctx, batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parallel: bool, interactive: bool) -> ExecArgs {
        ExecArgs {
            parallel,
            interactive,
            targets: vec!["a".to_string()],
            command: vec!["uptime".to_string()],
        }
    }

    #[test]
    fn test_mode_for() {
        assert_eq!(mode_for(&args(false, false)), ExecMode::Sequential);
        assert_eq!(mode_for(&args(true, false)), ExecMode::Parallel);
        assert_eq!(mode_for(&args(false, true)), ExecMode::Interactive);
    }
}

// Host batch commands
pub mod exec;
pub mod pull;
pub mod push_staged;
pub mod rebuild;
pub mod status;

// Inspection
pub mod resolve;

use anyhow::{Context as _, Result};
use fanout::Batch;
use hostgroups::HostGroups;

use crate::Context;
use crate::present;

/// Wrap a host group error, telling a broken group file apart from targets
/// that do not resolve.
pub(crate) fn group_error(ctx: &Context, err: hostgroups::Error) -> anyhow::Error {
    let message = if err.is_config_error() {
        format!("Invalid host group file: {}", ctx.hosts_file.display())
    } else {
        "Could not resolve hosts".to_string()
    };
    anyhow::Error::new(err).context(message)
}

/// Load the host group file named by the context
pub(crate) fn load_groups(ctx: &Context) -> Result<HostGroups> {
    HostGroups::load(&ctx.hosts_file).map_err(|err| group_error(ctx, err))
}

/// Resolve command-line targets to an ordered, de-duplicated host list.
///
/// No targets means the default group. Ending up with no hosts at all is an
/// error.
pub(crate) fn resolve_targets(ctx: &Context, targets: &[String]) -> Result<Vec<String>> {
    let groups = load_groups(ctx)?;
    let hosts = groups
        .resolve(targets)
        .map_err(|err| group_error(ctx, err))?;

    if hosts.is_empty() {
        anyhow::bail!(
            "No hosts specified and no default group in {}",
            ctx.hosts_file.display()
        );
    }

    log::debug!("Resolved {} host(s): {}", hosts.len(), hosts.join(", "));
    Ok(hosts)
}

/// Print a captured batch as a transcript and turn failures into an error.
pub(crate) fn report(ctx: &Context, batch: Batch) -> Result<()> {
    present::print_transcript(&ctx.theme, &batch).context("Could not write output")?;
    batch.into_result()?;
    Ok(())
}

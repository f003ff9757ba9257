use anyhow::Result;
use fanout::{ExecMode, LOCALHOST};

use crate::Context;
use crate::cli::RebuildArgs;
use crate::settings::RepoSettings;

fn rebuild_command(repo: &RepoSettings) -> String {
    format!("cd {} && {}", repo.remote_dir(), repo.rebuild_script)
}

/// Put `localhost` at the front of the host list, once.
fn local_first(mut hosts: Vec<String>) -> Vec<String> {
    hosts.retain(|host| host != LOCALHOST);
    hosts.insert(0, LOCALHOST.to_string());
    hosts
}

pub fn run(ctx: &Context, args: RebuildArgs) -> Result<()> {
    // `--local` alone is a valid request even without a default group
    let hosts = if args.local {
        let groups = super::load_groups(ctx)?;
        let resolved = groups
            .resolve(&args.target.targets)
            .map_err(|err| super::group_error(ctx, err))?;
        local_first(resolved)
    } else {
        super::resolve_targets(ctx, &args.target.targets)?
    };
    let command = rebuild_command(&ctx.settings.repo);

    log::info!("Rebuilding {} host(s): {}", hosts.len(), hosts.join(", "));
    super::exec::run_command(ctx, &hosts, &command, ExecMode::Interactive, "Rebuilding")
}

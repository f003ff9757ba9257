use anyhow::Result;
use fanout::ExecMode;

use crate::Context;
use crate::cli::TargetArgs;
use crate::settings::RepoSettings;

fn pull_command(repo: &RepoSettings) -> String {
    format!("cd {} && git pull", repo.remote_dir())
}

pub fn run(ctx: &Context, args: TargetArgs) -> Result<()> {
    let hosts = super::resolve_targets(ctx, &args.targets)?;
    let command = pull_command(&ctx.settings.repo);

    super::exec::run_command(ctx, &hosts, &command, ExecMode::Parallel, "Pulling changes")
}

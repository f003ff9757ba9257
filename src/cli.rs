use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "herd")]
#[command(version)]
#[command(about = "Run commands across a fleet of hosts over ssh", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Host group file (default: ~/.config/herd/hosts)
    #[arg(long, global = true, env = "HERD_HOSTS_FILE", value_name = "PATH")]
    pub hosts_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a command on hosts
    Exec(ExecArgs),

    /// Pull the configuration repository on hosts (in parallel)
    Pull(TargetArgs),

    /// Run the rebuild script on hosts, one at a time with a terminal
    Rebuild(RebuildArgs),

    /// Show a status table for hosts
    Status(StatusArgs),

    /// Show how host references resolve
    Resolve(TargetArgs),

    /// Apply locally staged changes to clean hosts
    PushStaged(PushStagedArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Hosts and groups to act on; empty means the default group
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Hostnames or @group references
    #[arg(value_name = "HOST|@GROUP")]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ExecArgs {
    /// Run on all hosts at once
    #[arg(short, long, conflicts_with = "interactive")]
    pub parallel: bool,

    /// Attach the terminal, one host at a time
    #[arg(short, long)]
    pub interactive: bool,

    /// Hostnames or @group references
    #[arg(value_name = "HOST|@GROUP")]
    pub targets: Vec<String>,

    /// Command to run, after `--`
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RebuildArgs {
    /// Rebuild this machine first
    #[arg(short, long)]
    pub local: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Output rows as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PushStagedArgs {
    /// Show what would be applied without changing any host
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

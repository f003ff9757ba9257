mod cli;
mod commands;
mod paths;
mod present;
mod probe;
mod progress;
mod runner;
mod settings;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use fanout::{BatchError, Engine, ShellTransport};
use settings::Settings;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use ui::Theme;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub theme: Theme,
    pub hosts_file: PathBuf,
    pub settings: Settings,
}

impl Context {
    fn new(cli: &Cli, theme: Theme) -> Result<Self> {
        let hosts_file = match &cli.hosts_file {
            Some(path) => paths::expand(&path.to_string_lossy()),
            None => paths::hosts_file()?,
        };
        let settings = Settings::load(&paths::settings_file()?)?;

        Ok(Self {
            verbose: cli.verbose,
            quiet: cli.quiet,
            theme,
            hosts_file,
            settings,
        })
    }

    /// Engine over the configured transport
    pub fn engine(&self) -> Engine<ShellTransport> {
        Engine::new(self.settings.transport())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let theme = Theme::detect(cli.no_color);
    colored::control::set_override(theme.is_color());

    match run(cli, theme) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<BatchError>() {
                Some(batch) => {
                    if let Err(write_err) =
                        present::write_failure_summary(&mut io::stderr(), &theme, batch)
                    {
                        log::debug!("could not write failure summary: {write_err}");
                    }
                }
                None => ui::error(&theme, &format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, theme: Theme) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "herd", &mut io::stdout());
        return Ok(());
    }

    let ctx = Context::new(&cli, theme)?;
    log::debug!(
        "Hosts file: {}, verbosity {}",
        ctx.hosts_file.display(),
        ctx.verbose
    );

    match cli.command {
        Command::Exec(args) => commands::exec::run(&ctx, args),
        Command::Pull(args) => commands::pull::run(&ctx, args),
        Command::Rebuild(args) => commands::rebuild::run(&ctx, args),
        Command::Status(args) => commands::status::run(&ctx, args),
        Command::Resolve(args) => commands::resolve::run(&ctx, args),
        Command::PushStaged(args) => commands::push_staged::run(&ctx, args),
        Command::Completions { .. } => Ok(()),
    }
}

//! Apply the changes staged in the local repository to remote checkouts.
//!
//! Hosts whose checkout has uncommitted changes are skipped rather than
//! patched on top of unknown state.

use anyhow::{Context as _, Result};
use fanout::{Batch, ExecMode, HostResult, Silent, Target};
use std::io::Write;
use std::path::Path;

use crate::Context;
use crate::cli::PushStagedArgs;
use crate::runner;
use crate::settings::{RepoSettings, TransportSettings};
use crate::ui;

/// Directory the patch is copied to on every host
const REMOTE_PATCH_DIR: &str = "/tmp";

/// Why a host will not receive the patch
#[derive(Debug, Clone, PartialEq, Eq)]
enum Skip {
    Dirty,
    Unreachable(String),
}

fn check_command(repo: &RepoSettings) -> String {
    format!("cd {} && git status --porcelain", repo.remote_dir())
}

/// Single-quote a path for the remote shell.
fn quoted(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// Apply a patch file on a host. A copied patch is removed after it applies;
/// a patch read in place belongs to the caller and is left alone.
fn apply_command(repo: &RepoSettings, patch: &str, remove: bool) -> String {
    let patch = quoted(patch);
    if remove {
        format!("cd {} && git apply {patch} && rm {patch}", repo.remote_dir())
    } else {
        format!("cd {} && git apply {patch}", repo.remote_dir())
    }
}

fn classify(result: &HostResult) -> Option<Skip> {
    match result.error() {
        Some(err) => Some(Skip::Unreachable(err.to_string())),
        None if !result.stdout().trim().is_empty() => Some(Skip::Dirty),
        None => None,
    }
}

/// Split a checkout probe into hosts ready for the patch and hosts to skip,
/// both in host order.
fn partition(batch: &Batch) -> (Vec<String>, Vec<(String, Skip)>) {
    let mut clean = Vec::new();
    let mut skipped = Vec::new();
    for result in batch {
        match classify(result) {
            None => clean.push(result.hostname().to_string()),
            Some(skip) => skipped.push((result.hostname().to_string(), skip)),
        }
    }
    (clean, skipped)
}

/// ssh options that scp understands, with ssh's `-p` port renamed to scp's
/// `-P`. Options scp reads differently are dropped.
fn scp_options(ssh_options: &[String]) -> Vec<String> {
    const SHARED: [char; 4] = ['o', 'i', 'F', 'J'];

    let mut forwarded = Vec::new();
    let mut options = ssh_options.iter();
    while let Some(option) = options.next() {
        let mut chars = option.chars();
        let flag = match (chars.next(), chars.next()) {
            (Some('-'), Some('p')) => 'P',
            (Some('-'), Some(flag)) if SHARED.contains(&flag) => flag,
            _ => {
                log::debug!("ssh option {option:?} is not passed to scp");
                continue;
            }
        };

        let inline = chars.as_str();
        let value = if inline.is_empty() {
            match options.next() {
                Some(value) => value.clone(),
                None => continue,
            }
        } else {
            inline.to_string()
        };
        forwarded.push(format!("-{flag}"));
        forwarded.push(value);
    }
    forwarded
}

/// Arguments for copying `source` to `host:remote` with scp over the
/// configured ssh program.
fn scp_args(transport: &TransportSettings, source: &str, host: &str, remote: &str) -> Vec<String> {
    let mut args = vec!["-q".to_string(), "-S".to_string(), transport.ssh.clone()];
    args.extend(scp_options(&transport.ssh_options));
    args.push("--".to_string());
    args.push(source.to_string());
    args.push(format!("{host}:{remote}"));
    args
}

fn copy_patch(transport: &TransportSettings, host: &str, local: &Path, remote: &str) -> Result<()> {
    let args = scp_args(transport, &local.to_string_lossy(), host, remote);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    runner::run_checked("scp", &args)
}

/// Split hosts into `localhost`, which reads the patch in place, and remote
/// hosts, which need a copy. Both keep host order.
fn split_local(hosts: Vec<String>) -> (Vec<String>, Vec<String>) {
    hosts
        .into_iter()
        .partition(|host| Target::parse(host).is_local())
}

pub fn run(ctx: &Context, args: PushStagedArgs) -> Result<()> {
    let theme = &ctx.theme;
    let repo_dir = ctx.settings.repo.local_dir()?;
    let diff = runner::run_capture_in(&repo_dir, "git", &["diff", "--cached"])
        .with_context(|| format!("Could not read staged changes in {}", repo_dir.display()))?;

    if diff.trim().is_empty() {
        ui::info(theme, &format!("No staged changes in {}", repo_dir.display()));
        return Ok(());
    }

    let hosts = super::resolve_targets(ctx, &args.target.targets)?;
    let engine = ctx.engine();

    let probe = engine.run(
        &hosts,
        &check_command(&ctx.settings.repo),
        ExecMode::Sequential,
        &Silent,
    )?;
    let (clean, skipped) = partition(&probe);

    for (host, skip) in &skipped {
        match skip {
            Skip::Dirty => ui::warn(
                theme,
                &format!("Skipping {}: uncommitted changes", theme.hostname(host)),
            ),
            Skip::Unreachable(reason) => {
                ui::warn(theme, &format!("Skipping {}: {reason}", theme.hostname(host)));
            }
        }
    }

    if clean.is_empty() {
        ui::warn(theme, "No clean hosts to apply staged changes to");
        return Ok(());
    }

    if args.dry_run {
        print!("{diff}");
        for host in &clean {
            ui::info(
                theme,
                &format!("Would apply staged changes to {}", theme.hostname(host)),
            );
        }
        return Ok(());
    }

    let mut patch = tempfile::Builder::new()
        .prefix("herd-staged-")
        .suffix(".patch")
        .tempfile()
        .context("Could not create patch file")?;
    patch
        .write_all(diff.as_bytes())
        .and_then(|()| patch.flush())
        .context("Could not write patch file")?;

    let local_patch = patch.path().to_string_lossy().into_owned();
    let file_name = patch
        .path()
        .file_name()
        .context("Patch file has no name")?
        .to_string_lossy()
        .into_owned();
    let remote = format!("{REMOTE_PATCH_DIR}/{file_name}");

    let (local, remote_hosts) = split_local(clean);

    let mut copied = Vec::new();
    let mut copy_failed = Vec::new();
    for host in remote_hosts {
        match copy_patch(&ctx.settings.transport, &host, patch.path(), &remote) {
            Ok(()) => copied.push(host),
            Err(err) => {
                ui::error(theme, &format!("{}: {err:#}", theme.hostname(&host)));
                copy_failed.push(host);
            }
        }
    }

    let mut applied = 0;
    for (hosts, command) in [
        (local, apply_command(&ctx.settings.repo, &local_patch, false)),
        (copied, apply_command(&ctx.settings.repo, &remote, true)),
    ] {
        if hosts.is_empty() {
            continue;
        }
        let batch = engine.run(&hosts, &command, ExecMode::Sequential, &Silent)?;
        super::report(ctx, batch)?;
        applied += hosts.len();
    }

    if applied > 0 {
        ui::success(
            theme,
            &format!("Applied staged changes to {applied} host(s)"),
        );
    }

    if !copy_failed.is_empty() {
        anyhow::bail!("Could not copy patch to: {}", copy_failed.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout::{Engine, ExecError, Transport};

    struct Checkouts;

    impl Transport for Checkouts {
        fn capture(&self, host: &str, command: &str) -> HostResult {
            match host {
                "dirty" => HostResult::new(host, command, " M flake.nix\n", "", None),
                "down" => HostResult::new(
                    host,
                    command,
                    "",
                    "",
                    Some(ExecError::Unreachable {
                        host: host.to_string(),
                        code: 255,
                    }),
                ),
                _ => HostResult::new(host, command, "", "", None),
            }
        }

        fn attach(&self, _host: &str, _command: &str) -> Result<(), ExecError> {
            Ok(())
        }
    }

    #[test]
    fn test_partition_keeps_host_order() {
        let hosts: Vec<String> = ["a", "dirty", "b", "down"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let batch = Engine::new(Checkouts)
            .run(&hosts, "status", ExecMode::Sequential, &Silent)
            .unwrap();

        let (clean, skipped) = partition(&batch);
        assert_eq!(clean, vec!["a", "b"]);
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0], ("dirty".to_string(), Skip::Dirty));
        assert_eq!(skipped[1].0, "down");
        assert!(matches!(&skipped[1].1, Skip::Unreachable(reason) if reason.contains("unreachable")));
    }

    #[test]
    fn test_commands() {
        let repo = RepoSettings::default();
        assert_eq!(
            check_command(&repo),
            "cd \"$HOME/nix-config\" && git status --porcelain"
        );
        assert_eq!(
            apply_command(&repo, "/tmp/x.patch", true),
            "cd \"$HOME/nix-config\" && git apply '/tmp/x.patch' && rm '/tmp/x.patch'"
        );
    }

    #[test]
    fn test_local_patch_is_applied_in_place() {
        let (local, remote) = split_local(vec![
            "a".to_string(),
            "localhost".to_string(),
            "b".to_string(),
        ]);
        assert_eq!(local, vec!["localhost"]);
        assert_eq!(remote, vec!["a", "b"]);

        let command = apply_command(&RepoSettings::default(), "/tmp/herd-staged-x.patch", false);
        assert_eq!(
            command,
            "cd \"$HOME/nix-config\" && git apply '/tmp/herd-staged-x.patch'"
        );
        assert!(!command.contains("rm "));
    }

    #[test]
    fn test_quoted_path() {
        assert_eq!(quoted("/tmp/a b.patch"), "'/tmp/a b.patch'");
        assert_eq!(quoted("/tmp/it's.patch"), r"'/tmp/it'\''s.patch'");
    }

    #[test]
    fn test_scp_args_use_configured_ssh() {
        let transport = TransportSettings {
            ssh: "ssh-wrapper".to_string(),
            ssh_options: ["-p", "2222", "-o", "BatchMode=yes", "-ikey", "-A", "-l", "admin"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            ..TransportSettings::default()
        };

        assert_eq!(
            scp_args(&transport, "/tmp/x.patch", "atlas", "/tmp/x.patch"),
            vec![
                "-q",
                "-S",
                "ssh-wrapper",
                "-P",
                "2222",
                "-o",
                "BatchMode=yes",
                "-i",
                "key",
                "--",
                "/tmp/x.patch",
                "atlas:/tmp/x.patch",
            ]
        );
    }

    #[test]
    fn test_scp_args_without_options() {
        assert_eq!(
            scp_args(&TransportSettings::default(), "/tmp/p", "h", "/tmp/p"),
            vec!["-q", "-S", "ssh", "--", "/tmp/p", "h:/tmp/p"]
        );
    }
}

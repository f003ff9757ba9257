//! Local process helpers for commands that need this machine's tools
//! (`git`, `scp`) rather than a host batch.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

fn describe(cmd: &str, args: &[&str]) -> String {
    if args.is_empty() {
        cmd.to_string()
    } else {
        format!("{} {}", cmd, args.join(" "))
    }
}

/// Run a command in `dir` and capture stdout, untrimmed
pub fn run_capture_in(dir: &Path, cmd: &str, args: &[&str]) -> Result<String> {
    log::debug!("Running in {}: {}", dir.display(), describe(cmd, args));

    let output = Command::new(cmd)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {}", describe(cmd, args)))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Command failed: {}: {}", describe(cmd, args), stderr.trim())
    }
}

/// Run a command, discarding stdout and surfacing stderr on failure
pub fn run_checked(cmd: &str, args: &[&str]) -> Result<()> {
    log::debug!("Running: {}", describe(cmd, args));

    let output = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {}", describe(cmd, args)))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Command failed: {}: {}", describe(cmd, args), stderr.trim())
    }
}

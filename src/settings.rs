use anyhow::{Context, Result};
use fanout::ShellTransport;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Settings Schema
// ============================================================================

/// Optional settings from `config.toml`
///
/// ```toml
/// [transport]
/// ssh = "ssh"
/// ssh_options = ["-o", "ConnectTimeout=5"]
/// local_shell = "bash"
///
/// [repo]
/// path = "nix-config"
/// rebuild_script = "./rebuild.sh"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How hosts are reached
    pub transport: TransportSettings,

    /// The configuration repository every host checks out
    pub repo: RepoSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportSettings {
    /// ssh program
    pub ssh: String,

    /// Extra ssh options, placed before the hostname
    pub ssh_options: Vec<String>,

    /// Shell used for `localhost`
    pub local_shell: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            ssh: "ssh".to_string(),
            ssh_options: Vec::new(),
            local_shell: "bash".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoSettings {
    /// Repository path, relative to `$HOME` unless absolute
    pub path: String,

    /// Script run by `rebuild`, relative to the repository
    pub rebuild_script: String,
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            path: "nix-config".to_string(),
            rebuild_script: "./rebuild.sh".to_string(),
        }
    }
}

/// Characters that keep their meaning inside a double-quoted shell word
const UNQUOTABLE: [char; 4] = ['"', '`', '$', '\\'];

impl Settings {
    /// Load settings, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read settings file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Parse settings from TOML
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Invalid TOML format")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.transport.ssh.trim().is_empty() {
            anyhow::bail!("transport.ssh cannot be empty");
        }
        if self.transport.local_shell.trim().is_empty() {
            anyhow::bail!("transport.local_shell cannot be empty");
        }
        if self.repo.path.trim().is_empty() {
            anyhow::bail!("repo.path cannot be empty");
        }
        // The path is placed inside double quotes in remote commands
        if let Some(c) = self.repo.path.chars().find(|c| UNQUOTABLE.contains(c)) {
            anyhow::bail!("repo.path cannot contain '{c}': {}", self.repo.path);
        }
        Ok(())
    }

    /// Build the transport described by these settings
    pub fn transport(&self) -> ShellTransport {
        ShellTransport::new()
            .with_ssh(&self.transport.ssh, self.transport.ssh_options.clone())
            .with_local_shell(&self.transport.local_shell)
    }
}

impl RepoSettings {
    /// Repository directory as a shell word for remote commands
    ///
    /// Relative paths are anchored at `$HOME`, expanded by the remote shell.
    pub fn remote_dir(&self) -> String {
        if self.path.starts_with('/') {
            format!("\"{}\"", self.path)
        } else {
            format!("\"$HOME/{}\"", self.path.trim_start_matches("~/"))
        }
    }

    /// Repository directory on this machine
    pub fn local_dir(&self) -> Result<PathBuf> {
        let path = crate::paths::expand(&self.path);
        if path.is_absolute() {
            return Ok(path);
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(path))
    }
}

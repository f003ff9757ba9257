//! Transport abstraction for running one command on one host.
//!
//! The [`Transport`] trait is the seam between the engine and the outside
//! world, allowing for different implementations:
//! - [`ShellTransport`]: `ssh` for remote hosts, a local shell for `localhost`
//! - Scripted transports for testing the engine without real hosts

use crate::error::ExecError;
use crate::result::HostResult;
use std::process::{Command, ExitStatus, Stdio};

/// Host reference that is executed on the controlling machine.
pub const LOCALHOST: &str = "localhost";

/// Exit status ssh uses for its own (connection-level) failures.
const SSH_TRANSPORT_FAILURE: i32 = 255;

/// Where a host reference is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The controlling machine, through the local shell
    Local,
    /// A remote host, through ssh
    Remote(&'a str),
}

impl<'a> Target<'a> {
    /// Route a host reference. Only the exact literal `localhost` is local.
    pub fn parse(host: &'a str) -> Self {
        if host == LOCALHOST {
            Self::Local
        } else {
            Self::Remote(host)
        }
    }

    /// Whether this target runs on the controlling machine.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Runs a command string on a single host.
pub trait Transport: Send + Sync {
    /// Run with stdout and stderr buffered separately.
    ///
    /// Never fails: launch errors and non-zero exits are recorded on the
    /// returned result.
    fn capture(&self, host: &str, command: &str) -> HostResult;

    /// Run with the controlling terminal wired directly to the child.
    fn attach(&self, host: &str, command: &str) -> Result<(), ExecError>;
}

/// Real transport: `ssh <host> <command>` or `<shell> -c <command>`.
#[derive(Debug, Clone)]
pub struct ShellTransport {
    ssh_program: String,
    ssh_options: Vec<String>,
    local_shell: String,
}

impl Default for ShellTransport {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            ssh_options: Vec::new(),
            local_shell: "bash".to_string(),
        }
    }
}

impl ShellTransport {
    /// Create a transport using `ssh` and `bash` from PATH.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different ssh program and extra options placed before the host.
    pub fn with_ssh(mut self, program: impl Into<String>, options: Vec<String>) -> Self {
        self.ssh_program = program.into();
        self.ssh_options = options;
        self
    }

    /// Use a different local shell for `localhost`.
    pub fn with_local_shell(mut self, shell: impl Into<String>) -> Self {
        self.local_shell = shell.into();
        self
    }

    /// Build the process for a target. `tty` requests a pseudo-terminal
    /// from ssh; it has no effect locally.
    fn build(&self, target: Target<'_>, command: &str, tty: bool) -> Command {
        match target {
            Target::Local => {
                let mut cmd = Command::new(&self.local_shell);
                cmd.arg("-c").arg(command);
                cmd
            }
            Target::Remote(host) => {
                let mut cmd = Command::new(&self.ssh_program);
                if tty {
                    cmd.arg("-t");
                }
                // A host starting with `-` must not be read as an option
                cmd.args(&self.ssh_options).arg("--").arg(host).arg(command);
                cmd
            }
        }
    }

    fn program(&self, target: Target<'_>) -> &str {
        if target.is_local() {
            &self.local_shell
        } else {
            &self.ssh_program
        }
    }
}

impl Transport for ShellTransport {
    fn capture(&self, host: &str, command: &str) -> HostResult {
        let target = Target::parse(host);
        log::debug!("capture on {host} via {}: {command}", self.program(target));

        let output = self
            .build(target, command, false)
            .stdin(Stdio::null())
            .output();

        match output {
            Ok(output) => HostResult::new(
                host,
                command,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
                classify_exit(host, target, output.status),
            ),
            Err(source) => HostResult::new(
                host,
                command,
                String::new(),
                String::new(),
                Some(ExecError::Launch {
                    host: host.to_string(),
                    program: self.program(target).to_string(),
                    source,
                }),
            ),
        }
    }

    fn attach(&self, host: &str, command: &str) -> Result<(), ExecError> {
        let target = Target::parse(host);
        log::debug!("attach on {host} via {}: {command}", self.program(target));

        let status = self
            .build(target, command, true)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ExecError::Launch {
                host: host.to_string(),
                program: self.program(target).to_string(),
                source,
            })?;

        match classify_exit(host, target, status) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Turn an exit status into a classified error, or `None` on success.
pub fn classify_exit(host: &str, target: Target<'_>, status: ExitStatus) -> Option<ExecError> {
    if status.success() {
        return None;
    }

    let host = host.to_string();
    Some(match status.code() {
        Some(SSH_TRANSPORT_FAILURE) if !target.is_local() => ExecError::Unreachable {
            host,
            code: SSH_TRANSPORT_FAILURE,
        },
        Some(code) => ExecError::Exit { host, code },
        None => ExecError::Signaled { host },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_target_routing() {
        assert_eq!(Target::parse("localhost"), Target::Local);
        assert_eq!(Target::parse("atlas"), Target::Remote("atlas"));
        // Only the exact sentinel is local
        assert_eq!(Target::parse("LOCALHOST"), Target::Remote("LOCALHOST"));
        assert_eq!(Target::parse("127.0.0.1"), Target::Remote("127.0.0.1"));
    }

    #[test]
    fn test_remote_command_passed_verbatim() {
        let transport = ShellTransport::new();
        let cmd = transport.build(Target::Remote("atlas"), "cd $HOME && ls", false);

        assert_eq!(cmd.get_program(), "ssh");
        assert_eq!(args(&cmd), vec!["--", "atlas", "cd $HOME && ls"]);
    }

    #[test]
    fn test_attached_remote_requests_tty() {
        let transport =
            ShellTransport::new().with_ssh("ssh", vec!["-o".into(), "BatchMode=yes".into()]);
        let cmd = transport.build(Target::Remote("atlas"), "sudo true", true);

        assert_eq!(args(&cmd), vec!["-t", "-o", "BatchMode=yes", "--", "atlas", "sudo true"]);
    }

    #[test]
    fn test_dash_host_is_not_an_option() {
        let transport = ShellTransport::new();
        let cmd = transport.build(Target::Remote("-oProxyCommand=evil"), "true", false);

        assert_eq!(args(&cmd), vec!["--", "-oProxyCommand=evil", "true"]);
    }

    #[test]
    fn test_local_uses_shell() {
        let transport = ShellTransport::new().with_local_shell("sh");
        let cmd = transport.build(Target::Local, "echo hi", true);

        assert_eq!(cmd.get_program(), "sh");
        assert_eq!(args(&cmd), vec!["-c", "echo hi"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_localhost_separates_streams() {
        let transport = ShellTransport::new().with_local_shell("sh");
        let result = transport.capture(LOCALHOST, "echo out; echo err >&2");

        assert!(result.is_success());
        assert_eq!(result.hostname(), "localhost");
        assert_eq!(result.stdout(), "out\n");
        assert_eq!(result.stderr(), "err\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_localhost_nonzero_keeps_output() {
        let transport = ShellTransport::new().with_local_shell("sh");
        let result = transport.capture(LOCALHOST, "echo partial; exit 3");

        assert_eq!(result.stdout(), "partial\n");
        match result.error() {
            Some(ExecError::Exit { host, code }) => {
                assert_eq!(host, "localhost");
                assert_eq!(*code, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_local_exit_255_is_not_unreachable() {
        let transport = ShellTransport::new().with_local_shell("sh");
        let result = transport.capture(LOCALHOST, "exit 255");

        assert_eq!(
            result.error().map(ExecError::category),
            Some(ErrorCategory::Command)
        );
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let transport = ShellTransport::new().with_ssh("herd-no-such-ssh-binary", Vec::new());
        let result = transport.capture("atlas", "true");

        match result.error() {
            Some(ExecError::Launch { host, program, .. }) => {
                assert_eq!(host, "atlas");
                assert_eq!(program, "herd-no-such-ssh-binary");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

//! Error types for host group loading and resolution.
//!
//! Parse errors always carry the 1-indexed line number of the offending
//! line so the operator can jump straight to it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a group file or resolving targets.
#[derive(Debug, Error)]
pub enum Error {
    /// The group file exists but could not be read
    #[error("failed to read host file {}: {source}", .path.display())]
    Io {
        /// Path of the group file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A directive line with fewer than two fields
    #[error("invalid syntax on line {line}: {text}")]
    Syntax {
        /// Line number (1-indexed)
        line: usize,
        /// The trimmed line content
        text: String,
    },

    /// `group <name>` without any hosts
    #[error("group directive requires at least one host on line {line}: {text}")]
    GroupMissingHosts {
        /// Line number (1-indexed)
        line: usize,
        /// The trimmed line content
        text: String,
    },

    /// `default` with more than one group name
    #[error("default directive requires exactly one group name on line {line}: {text}")]
    DefaultArity {
        /// Line number (1-indexed)
        line: usize,
        /// The trimmed line content
        text: String,
    },

    /// First token is neither `group` nor `default`
    #[error("unknown directive '{directive}' on line {line}")]
    UnknownDirective {
        /// Line number (1-indexed)
        line: usize,
        /// The unrecognised first token
        directive: String,
    },

    /// The declared default group is never defined in the file
    #[error("default group '{0}' is not defined")]
    UndefinedDefault(String),

    /// A bare `@` token
    #[error("empty group name: {0}")]
    EmptyGroupName(String),

    /// `@name` where `name` is not a defined group
    #[error("unknown group: {0}")]
    UnknownGroup(String),
}

impl Error {
    /// Whether this error was raised while loading the group file, as
    /// opposed to while resolving command-line targets.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::EmptyGroupName(_) | Self::UnknownGroup(_))
    }
}

/// Result type for host group operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_vs_resolution_errors() {
        assert!(Error::UndefinedDefault("lab".into()).is_config_error());
        assert!(
            Error::Syntax {
                line: 3,
                text: "group".into()
            }
            .is_config_error()
        );
        assert!(!Error::UnknownGroup("lab".into()).is_config_error());
        assert!(!Error::EmptyGroupName("@".into()).is_config_error());
    }

    #[test]
    fn test_messages_name_the_line() {
        let err = Error::UnknownDirective {
            line: 7,
            directive: "host".into(),
        };
        assert_eq!(err.to_string(), "unknown directive 'host' on line 7");
    }
}

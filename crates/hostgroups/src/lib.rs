//! # hostgroups
//!
//! Named host groups for fleet-style command line tools.
//!
//! This crate provides:
//! - A parser for a small line-oriented group file
//! - Expansion of `@group` tokens and literal hostnames into an ordered,
//!   deduplicated host list
//!
//! ## Example
//!
//! ```
//! use hostgroups::HostGroups;
//!
//! let groups = hostgroups::parse_string("group lab atlas hermes\ndefault lab\n").unwrap();
//!
//! // No arguments falls back to the default group
//! assert_eq!(groups.resolve::<&str>(&[]).unwrap(), vec!["atlas", "hermes"]);
//!
//! // Groups and literal hosts are merged, first occurrence wins
//! let hosts = groups.resolve(&["hermes", "@lab"]).unwrap();
//! assert_eq!(hosts, vec!["hermes", "atlas"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod parser;

pub use error::{Error, Result};
pub use parser::{parse_file, parse_string};

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Prefix that marks a command-line token as a group reference.
pub const GROUP_SIGIL: char = '@';

/// Parsed host group configuration.
///
/// Groups are kept sorted by name so listings are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostGroups {
    /// Group name to ordered host list
    pub groups: BTreeMap<String, Vec<String>>,
    /// Group used when no targets are given; always names a defined group
    pub default_group: Option<String>,
}

/// How a single command-line token expands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// `@name` referring to a defined group
    Group {
        /// Group name without the sigil
        name: &'a str,
        /// Hosts in the group
        hosts: &'a [String],
    },
    /// `@name` with no such group (or an empty name)
    UnknownGroup(&'a str),
    /// A literal hostname
    Host(&'a str),
}

impl HostGroups {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file path. A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        parse_file(path)
    }

    /// Hosts in a group, if defined.
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Hosts in the default group, if one is declared.
    pub fn default_hosts(&self) -> Option<&[String]> {
        self.default_group.as_deref().and_then(|name| self.group(name))
    }

    /// Expand targets into an ordered list of unique hostnames.
    ///
    /// With no targets the default group is returned verbatim, or an empty
    /// list when there is no default; deciding whether zero hosts is an
    /// error is left to the caller. Any bad group reference fails the whole
    /// call.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<Vec<String>> {
        if args.is_empty() {
            let mut seen = HashSet::new();
            return Ok(self
                .default_hosts()
                .unwrap_or_default()
                .iter()
                .filter(|host| seen.insert(host.as_str()))
                .cloned()
                .collect());
        }

        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        for arg in args {
            let arg = arg.as_ref();
            match arg.strip_prefix(GROUP_SIGIL) {
                Some("") => return Err(Error::EmptyGroupName(arg.to_string())),
                Some(name) => {
                    let hosts = self
                        .group(name)
                        .ok_or_else(|| Error::UnknownGroup(name.to_string()))?;
                    for host in hosts {
                        if seen.insert(host.as_str()) {
                            resolved.push(host.clone());
                        }
                    }
                }
                None => {
                    if seen.insert(arg) {
                        resolved.push(arg.to_string());
                    }
                }
            }
        }

        Ok(resolved)
    }

    /// Describe how a single token expands, without failing.
    pub fn describe<'a>(&'a self, token: &'a str) -> Resolution<'a> {
        match token.strip_prefix(GROUP_SIGIL) {
            Some(name) => match self.groups.get_key_value(name) {
                Some((name, hosts)) if !name.is_empty() => Resolution::Group { name, hosts },
                _ => Resolution::UnknownGroup(name),
            },
            None => Resolution::Host(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab() -> HostGroups {
        parse_string("group g h1 h2\ngroup pis pi1 pi2 h2\n").unwrap()
    }

    #[test]
    fn test_dedup_first_seen_order() {
        let hosts = lab().resolve(&["@g", "h1", "@g"]).unwrap();
        assert_eq!(hosts, vec!["h1", "h2"]);
    }

    #[test]
    fn test_host_before_group_keeps_its_position() {
        let hosts = lab().resolve(&["pi2", "@pis", "@g"]).unwrap();
        assert_eq!(hosts, vec!["pi2", "pi1", "h2", "h1"]);
    }

    #[test]
    fn test_literal_duplicates_collapse() {
        let hosts = lab().resolve(&["a", "b", "a"]).unwrap();
        assert_eq!(hosts, vec!["a", "b"]);
    }

    #[test]
    fn test_default_group_fallback() {
        let groups = parse_string("group g a b\ndefault g\n").unwrap();
        assert_eq!(groups.resolve::<&str>(&[]).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_default_group_with_repeated_host() {
        let groups = parse_string("group g a b a\ndefault g\n").unwrap();
        assert_eq!(groups.resolve::<&str>(&[]).unwrap(), vec!["a", "b"]);
        assert_eq!(groups.resolve(&["@g"]).unwrap(), vec!["a", "b"]);

        // Groups assembled in code take the same path
        let mut built = HostGroups::new();
        built
            .groups
            .insert("g".to_string(), vec!["x".into(), "y".into(), "x".into()]);
        built.default_group = Some("g".to_string());
        assert_eq!(built.resolve::<&str>(&[]).unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_no_args_no_default_is_empty() {
        assert!(HostGroups::new().resolve::<&str>(&[]).unwrap().is_empty());
        assert!(lab().resolve::<String>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_default_ignored_when_args_given() {
        let groups = parse_string("group g a b\ndefault g\n").unwrap();
        assert_eq!(groups.resolve(&["c"]).unwrap(), vec!["c"]);
    }

    #[test]
    fn test_unknown_group_fails_without_partial_list() {
        let err = HostGroups::new().resolve(&["@missing"]).unwrap_err();
        assert!(matches!(err, Error::UnknownGroup(ref name) if name == "missing"));

        let err = lab().resolve(&["h1", "@g", "@nope"]).unwrap_err();
        assert!(matches!(err, Error::UnknownGroup(_)));
    }

    #[test]
    fn test_bare_sigil_fails() {
        let err = lab().resolve(&["h1", "@"]).unwrap_err();
        assert!(matches!(err, Error::EmptyGroupName(ref token) if token == "@"));
    }

    #[test]
    fn test_describe_tokens() {
        let groups = lab();
        assert_eq!(
            groups.describe("@g"),
            Resolution::Group {
                name: "g",
                hosts: &["h1".to_string(), "h2".to_string()],
            }
        );
        assert_eq!(groups.describe("@zzz"), Resolution::UnknownGroup("zzz"));
        assert_eq!(groups.describe("@"), Resolution::UnknownGroup(""));
        assert_eq!(groups.describe("atlas"), Resolution::Host("atlas"));
    }
}

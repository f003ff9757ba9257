//! Parser for the plain-text host group file.
//!
//! The format is line oriented, one directive per line:
//! ```text
//! # comments and blank lines are ignored
//! group servers atlas hermes
//! group desktops localhost mercury
//! default servers
//! ```

use crate::HostGroups;
use crate::error::{Error, Result};
use std::path::Path;

/// Load a group file from disk.
///
/// A file that does not exist is not an error: it yields an empty
/// configuration with no groups and no default.
pub fn parse_file(path: &Path) -> Result<HostGroups> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HostGroups::new()),
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_string(&content)
}

/// Parse a group file from a string.
pub fn parse_string(content: &str) -> Result<HostGroups> {
    let mut config = HostGroups::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        parse_line(&mut config, line, idx + 1)?;
    }

    // The default may be declared before its group, so check it last
    if let Some(default) = &config.default_group
        && !config.groups.contains_key(default)
    {
        return Err(Error::UndefinedDefault(default.clone()));
    }

    Ok(config)
}

/// Apply a single non-empty, non-comment line to the configuration.
fn parse_line(config: &mut HostGroups, line: &str, line_num: usize) -> Result<()> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < 2 {
        return Err(Error::Syntax {
            line: line_num,
            text: line.to_string(),
        });
    }

    match fields[0] {
        "group" => {
            if fields.len() < 3 {
                return Err(Error::GroupMissingHosts {
                    line: line_num,
                    text: line.to_string(),
                });
            }
            // Repeated hosts within one group keep their first position
            let mut hosts: Vec<String> = Vec::with_capacity(fields.len() - 2);
            for host in &fields[2..] {
                if !hosts.iter().any(|h| h == host) {
                    hosts.push((*host).to_string());
                }
            }
            // Last definition wins
            config.groups.insert(fields[1].to_string(), hosts);
        }
        "default" => {
            if fields.len() != 2 {
                return Err(Error::DefaultArity {
                    line: line_num,
                    text: line.to_string(),
                });
            }
            config.default_group = Some(fields[1].to_string());
        }
        other => {
            return Err(Error::UnknownDirective {
                line: line_num,
                directive: other.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_groups_and_default() {
        let content = r"
# homelab
group servers atlas hermes
group desktops localhost mercury

default servers
";
        let config = parse_string(content).unwrap();

        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups["servers"], vec!["atlas", "hermes"]);
        assert_eq!(config.groups["desktops"], vec!["localhost", "mercury"]);
        assert_eq!(config.default_group.as_deref(), Some("servers"));
    }

    #[test]
    fn test_default_may_precede_group() {
        let config = parse_string("default lab\ngroup lab a b\n").unwrap();
        assert_eq!(config.default_group.as_deref(), Some("lab"));
    }

    #[test]
    fn test_duplicate_group_last_wins() {
        let config = parse_string("group lab a b\ngroup lab c\n").unwrap();
        assert_eq!(config.groups["lab"], vec!["c"]);
    }

    #[test]
    fn test_repeated_host_in_group_kept_once() {
        let config = parse_string("group lab a b a c b\n").unwrap();
        assert_eq!(config.groups["lab"], vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tabs_and_indentation() {
        let config = parse_string("  group\tlab   a\tb  \n").unwrap();
        assert_eq!(config.groups["lab"], vec!["a", "b"]);
    }

    #[test]
    fn test_dangling_default_fails_at_load() {
        let err = parse_string("group lab a\ndefault missing\n").unwrap_err();
        assert!(matches!(err, Error::UndefinedDefault(ref name) if name == "missing"));
    }

    #[test]
    fn test_group_without_hosts() {
        let err = parse_string("# header\ngroup lab\n").unwrap_err();
        assert!(matches!(err, Error::GroupMissingHosts { line: 2, .. }));
    }

    #[test]
    fn test_single_token_line() {
        let err = parse_string("group lab a\n\ndefault\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 3, .. }));
    }

    #[test]
    fn test_default_with_two_names() {
        let err = parse_string("default a b\n").unwrap_err();
        assert!(matches!(err, Error::DefaultArity { line: 1, .. }));
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse_string("host atlas\n").unwrap_err();
        match err {
            Error::UnknownDirective { line, directive } => {
                assert_eq!(line, 1);
                assert_eq!(directive, "host");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let temp = TempDir::new().unwrap();
        let config = parse_file(&temp.path().join("hosts")).unwrap();
        assert!(config.groups.is_empty());
        assert!(config.default_group.is_none());
    }

    #[test]
    fn test_parse_file_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hosts");
        fs::write(&path, "group lab atlas\ndefault lab\n").unwrap();

        let config = parse_file(&path).unwrap();
        assert_eq!(config.groups["lab"], vec!["atlas"]);
        assert_eq!(config.default_group.as_deref(), Some("lab"));
    }
}

//! Compound status probe
//!
//! A single shell command that prints five measurements on one line, joined
//! by [`FIELD_DELIMITER`], so `status` needs one round trip per host. Every
//! measurement falls back to `unknown` or `error` on its own, keeping the
//! field count fixed.

use fanout::HostResult;
use serde::Serialize;

use crate::settings::RepoSettings;

/// Separator between probe fields
pub const FIELD_DELIMITER: &str = "|||";

/// Number of fields a well-formed probe line carries
pub const FIELD_COUNT: usize = 5;

/// Value used for every field of a host whose probe could not be read
pub const SENTINEL: &str = "error";

const LINUX_MEMORY: &str = r#"free | grep '^Mem:' | awk '{printf "%.0f%%", $3/$2*100}'"#;

const MACOS_MEMORY: &str = r#"vm_stat | awk '/^Pages free/ {free=$3} /^Pages inactive/ {inactive=$3} /^Pages wired/ {wired=$4} /^Pages active/ {active=$3} END {total=free+inactive+wired+active; if (total > 0) printf "%.0f%%", (wired+active)/total*100}'"#;

/// Build the probe command for a repository location.
pub fn compound_command(repo: &RepoSettings) -> String {
    let dir = repo.remote_dir();
    [
        r#"hc="${HOSTCLASS:-unknown}""#.to_string(),
        "rev=\"$(nixos-version --configuration-revision 2>/dev/null \
         || darwin-version --configuration-revision 2>/dev/null || echo unknown)\""
            .to_string(),
        r#"disk="$(df -h / 2>/dev/null | tail -1 | awk '{print $5}')""#.to_string(),
        format!(
            "mem=\"$(if command -v free >/dev/null 2>&1; then {LINUX_MEMORY}; else {MACOS_MEMORY}; fi 2>/dev/null)\""
        ),
        format!(
            "git=\"$(cd {dir} 2>/dev/null && git rev-parse --git-dir >/dev/null 2>&1 \
             && {{ [ -z \"$(git status --porcelain 2>/dev/null)\" ] && echo clean || echo dirty; }} \
             || echo error)\""
        ),
        format!(
            "printf '%s{d}%s{d}%s{d}%s{d}%s\\n' \"$hc\" \"$rev\" \"${{disk:-unknown}}\" \"${{mem:-unknown}}\" \"$git\"",
            d = FIELD_DELIMITER
        ),
    ]
    .join("; ")
}

/// Status of one host, either fully decoded or fully sentineled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub host_class: String,
    pub config_revision: String,
    pub disk_usage: String,
    pub memory_usage: String,
    pub repo_state: String,
}

impl StatusRecord {
    /// Decode one probe line. Anything but exactly [`FIELD_COUNT`] fields
    /// yields `None`; fields are never partially filled.
    pub fn decode(output: &str) -> Option<Self> {
        let fields: Vec<&str> = output.trim().split(FIELD_DELIMITER).map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return None;
        }

        match fields.as_slice() {
            [host_class, config_revision, disk_usage, memory_usage, repo_state] => Some(Self {
                host_class: (*host_class).to_string(),
                config_revision: (*config_revision).to_string(),
                disk_usage: (*disk_usage).to_string(),
                memory_usage: (*memory_usage).to_string(),
                repo_state: (*repo_state).to_string(),
            }),
            _ => None,
        }
    }

    /// Every field set to [`SENTINEL`]
    pub fn sentinel() -> Self {
        Self {
            host_class: SENTINEL.to_string(),
            config_revision: SENTINEL.to_string(),
            disk_usage: SENTINEL.to_string(),
            memory_usage: SENTINEL.to_string(),
            repo_state: SENTINEL.to_string(),
        }
    }

    /// Record for a host result: a failed run or malformed output is
    /// sentineled as a whole.
    pub fn from_result(result: &HostResult) -> Self {
        if !result.is_success() {
            return Self::sentinel();
        }
        Self::decode(result.stdout()).unwrap_or_else(|| {
            log::debug!(
                "malformed probe output from {}: {:?}",
                result.hostname(),
                result.stdout()
            );
            Self::sentinel()
        })
    }
}

/// One row of the status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub hostname: String,
    #[serde(flatten)]
    pub record: StatusRecord,
}

impl From<&HostResult> for StatusRow {
    fn from(result: &HostResult) -> Self {
        Self {
            hostname: result.hostname().to_string(),
            record: StatusRecord::from_result(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout::ExecError;

    fn ok(host: &str, stdout: &str) -> HostResult {
        HostResult::new(host, "probe", stdout, "", None)
    }

    #[test]
    fn test_decode_well_formed() {
        let record = StatusRecord::decode("classA|||rev1|||40%|||55%|||clean\n").unwrap();
        assert_eq!(record.host_class, "classA");
        assert_eq!(record.config_revision, "rev1");
        assert_eq!(record.disk_usage, "40%");
        assert_eq!(record.memory_usage, "55%");
        assert_eq!(record.repo_state, "clean");
    }

    #[test]
    fn test_decode_trims_fields() {
        let record = StatusRecord::decode("  server ||| abc123 |||12%|||7%||| dirty ").unwrap();
        assert_eq!(record.host_class, "server");
        assert_eq!(record.config_revision, "abc123");
        assert_eq!(record.repo_state, "dirty");
    }

    #[test]
    fn test_decode_allows_empty_fields() {
        let record = StatusRecord::decode("|||rev|||1%|||2%|||clean").unwrap();
        assert_eq!(record.host_class, "");
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        assert_eq!(StatusRecord::decode("a|||b|||c|||d"), None);
        assert_eq!(StatusRecord::decode("a|||b|||c|||d|||e|||f"), None);
        assert_eq!(StatusRecord::decode(""), None);
        assert_eq!(StatusRecord::decode("\n"), None);
    }

    #[test]
    fn test_failed_result_is_sentineled() {
        let result = HostResult::new(
            "atlas",
            "probe",
            "classA|||rev1|||40%|||55%|||clean",
            "",
            Some(ExecError::Unreachable {
                host: "atlas".into(),
                code: 255,
            }),
        );
        assert_eq!(StatusRecord::from_result(&result), StatusRecord::sentinel());
    }

    #[test]
    fn test_rows_are_independent() {
        let results = [
            ok("a", "x|||r|||1%|||2%|||clean"),
            ok("b", "garbage"),
            ok("c", "y|||s|||3%|||4%|||dirty"),
        ];
        let rows: Vec<StatusRow> = results.iter().map(StatusRow::from).collect();

        assert_eq!(rows[0].record.host_class, "x");
        assert_eq!(rows[1].record, StatusRecord::sentinel());
        assert_eq!(rows[1].hostname, "b");
        assert_eq!(rows[2].record.repo_state, "dirty");
    }

    #[test]
    fn test_compound_command_shape() {
        let command = compound_command(&RepoSettings::default());
        assert!(command.contains("\"$HOME/nix-config\""));
        assert!(command.contains("printf '%s|||%s|||%s|||%s|||%s\\n'"));
        assert!(command.contains("HOSTCLASS"));
    }

    #[cfg(unix)]
    #[test]
    fn test_compound_command_emits_five_fields_locally() {
        use fanout::{LOCALHOST, ShellTransport, Transport};

        let transport = ShellTransport::new().with_local_shell("sh");
        let result = transport.capture(LOCALHOST, &compound_command(&RepoSettings::default()));

        assert!(result.is_success(), "probe failed: {}", result.stderr());
        assert_eq!(result.stdout().trim().matches(FIELD_DELIMITER).count(), 4);
        assert!(StatusRecord::decode(result.stdout()).is_some());
    }
}

use anyhow::Result;
use hostgroups::{HostGroups, Resolution};
use std::io::{self, Write};

use crate::Context;
use crate::cli::TargetArgs;
use crate::ui::{self, Theme};

fn write_groups(out: &mut impl Write, theme: &Theme, groups: &HostGroups) -> io::Result<()> {
    if groups.groups.is_empty() {
        return writeln!(out, "  {}", theme.dim("(no groups defined)"));
    }
    for (name, hosts) in &groups.groups {
        let marker = if groups.default_group.as_deref() == Some(name.as_str()) {
            theme.success(" (default)")
        } else {
            String::new()
        };
        writeln!(out, "  {}{}: {}", theme.bold(&format!("@{name}")), marker, hosts.join(", "))?;
    }
    Ok(())
}

fn write_token(out: &mut impl Write, theme: &Theme, token: &str, resolution: &Resolution<'_>) -> io::Result<()> {
    match resolution {
        Resolution::Group { name, hosts } => writeln!(
            out,
            "  {} → group {}: {}",
            token,
            name,
            hosts.join(", ")
        ),
        Resolution::UnknownGroup(name) => writeln!(
            out,
            "  {} → {}",
            token,
            theme.error(&format!("unknown group '{name}'"))
        ),
        Resolution::Host(host) => writeln!(out, "  {} → host {}", token, theme.hostname(host)),
    }
}

/// Show the loaded group file and how each target expands.
pub fn run(ctx: &Context, args: TargetArgs) -> Result<()> {
    let groups = super::load_groups(ctx)?;

    ui::kv(&ctx.theme, "Hosts file", &ctx.hosts_file.display().to_string());
    ui::kv(
        &ctx.theme,
        "Default group",
        groups.default_group.as_deref().unwrap_or("(none)"),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", ctx.theme.info("Groups:"))?;
    write_groups(&mut out, &ctx.theme, &groups)?;

    if !args.targets.is_empty() {
        writeln!(out, "{}", ctx.theme.info("Targets:"))?;
        for token in &args.targets {
            write_token(&mut out, &ctx.theme, token, &groups.describe(token))?;
        }
    }
    out.flush()?;
    drop(out);

    let hosts = groups
        .resolve(&args.targets)
        .map_err(|err| super::group_error(ctx, err))?;

    if hosts.is_empty() {
        ui::warn(&ctx.theme, "No hosts resolved");
    } else {
        ui::kv(
            &ctx.theme,
            &format!("Resolved ({})", hosts.len()),
            &hosts.join(", "),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> HostGroups {
        hostgroups::parse_string("group web a b\ngroup db c\ndefault web\n").unwrap()
    }

    #[test]
    fn test_write_groups_marks_default() {
        let mut out = Vec::new();
        write_groups(&mut out, &Theme::plain(), &groups()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  @db: c\n  @web (default): a, b\n"
        );
    }

    #[test]
    fn test_write_groups_empty() {
        let mut out = Vec::new();
        write_groups(&mut out, &Theme::plain(), &HostGroups::new()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  (no groups defined)\n");
    }

    #[test]
    fn test_write_token() {
        let groups = groups();
        let mut out = Vec::new();
        for token in ["@web", "@nope", "x"] {
            write_token(&mut out, &Theme::plain(), token, &groups.describe(token)).unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  @web → group web: a, b\n  @nope → unknown group 'nope'\n  x → host x\n"
        );
    }
}

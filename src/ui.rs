use colored::{ColoredString, Colorize};
use std::io::IsTerminal;

// ============================================================================
// Theme
// ============================================================================

/// Environment variable that disables color for herd only
pub const ENV_NO_COLOR: &str = "HERD_NO_COLOR";

/// Presentation settings, decided once at startup and passed to every
/// renderer. Rendering code never looks at the environment itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Uncolored output
    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Decide on color from the `--no-color` flag, `NO_COLOR`,
    /// `HERD_NO_COLOR`, and whether stdout is a terminal.
    pub fn detect(no_color_flag: bool) -> Self {
        let env_disabled = |key: &str| std::env::var_os(key).is_some_and(|v| !v.is_empty());
        let color = !no_color_flag
            && !env_disabled("NO_COLOR")
            && !env_disabled(ENV_NO_COLOR)
            && std::io::stdout().is_terminal();
        Self::new(color)
    }

    pub fn is_color(&self) -> bool {
        self.color
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, |t| t.green())
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red())
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow())
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan())
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    pub fn header(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().bold())
    }

    pub fn hostname(&self, text: &str) -> String {
        self.paint(text, |t| t.yellow().bold())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dimmed())
    }

    /// Color a usage percentage: red from 90%, yellow from 70%, green below.
    /// `error` is always red; anything unparseable is left alone.
    pub fn usage(&self, value: &str) -> String {
        if value == crate::probe::SENTINEL {
            return self.error(value);
        }

        match value.strip_suffix('%').and_then(|n| n.parse::<u32>().ok()) {
            Some(percent) if percent >= 90 => self.error(value),
            Some(percent) if percent >= 70 => self.warning(value),
            Some(_) => self.success(value),
            None => value.to_string(),
        }
    }

    /// Color the repository state column
    pub fn repo_state(&self, value: &str) -> String {
        match value {
            "clean" => self.success(value),
            "dirty" => self.warning(value),
            crate::probe::SENTINEL => self.error(value),
            _ => value.to_string(),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Print an info message
pub fn info(theme: &Theme, msg: &str) {
    println!("{} {}", theme.info("ℹ"), msg);
}

/// Print a success message
pub fn success(theme: &Theme, msg: &str) {
    println!("{} {}", theme.success("✓"), msg);
}

/// Print a warning message
pub fn warn(theme: &Theme, msg: &str) {
    println!("{} {}", theme.warning("⚠"), msg);
}

/// Print an error message
pub fn error(theme: &Theme, msg: &str) {
    eprintln!("{} {}", theme.error("✗"), msg);
}

/// Print a key-value pair
pub fn kv(theme: &Theme, key: &str, value: &str) {
    println!("{} {}", theme.info(&format!("{key}:")), value);
}

// ============================================================================
// Tests
// ============================================================================

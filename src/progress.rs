//! Progress indicators for herd CLI.
//!
//! Only multi-host parallel runs get a spinner. It lives on stderr, counts
//! finished hosts, and is cleared before any host output is printed.

use fanout::{HostResult, Observer, Silent};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::OnceLock;
use std::time::Duration;

use crate::ui::Theme;

/// Create a spinner with the given message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn counter_message(label: &str, completed: usize, total: usize) -> String {
    format!("{label}... ({completed}/{total} hosts)")
}

/// Spinner showing `completed/total` while a parallel batch runs.
pub struct SpinnerObserver {
    label: String,
    theme: Theme,
    bar: OnceLock<ProgressBar>,
}

impl SpinnerObserver {
    pub fn new(label: impl Into<String>, theme: Theme) -> Self {
        Self {
            label: label.into(),
            theme,
            bar: OnceLock::new(),
        }
    }
}

impl Observer for SpinnerObserver {
    fn batch_started(&self, total: usize) {
        if self
            .bar
            .set(spinner(&counter_message(&self.label, 0, total)))
            .is_err()
        {
            log::debug!("spinner for {} was already started", self.label);
        }
    }

    fn host_finished(&self, completed: usize, total: usize, _result: &HostResult) {
        if let Some(pb) = self.bar.get() {
            pb.set_message(counter_message(&self.label, completed, total));
        }
    }

    fn batch_finished(&self, total: usize) {
        if let Some(pb) = self.bar.get() {
            pb.finish_and_clear();
        }
        println!(
            "{} {} completed ({total}/{total} hosts)",
            self.theme.success("✓"),
            self.label
        );
    }
}

/// Observer for a parallel run: a spinner when more than one host is
/// involved and output is not suppressed, otherwise nothing.
pub fn parallel_observer(
    label: &str,
    host_count: usize,
    quiet: bool,
    theme: Theme,
) -> Box<dyn Observer> {
    if host_count > 1 && !quiet {
        Box::new(SpinnerObserver::new(label, theme))
    } else {
        Box::new(Silent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_message() {
        assert_eq!(
            counter_message("Pulling changes", 2, 5),
            "Pulling changes... (2/5 hosts)"
        );
    }

    #[test]
    fn test_spinner_lifecycle() {
        let observer = SpinnerObserver::new("Probing", Theme::plain());
        let result = HostResult::new("atlas", "true", "", "", None);

        observer.batch_started(2);
        observer.host_finished(1, 2, &result);
        assert_eq!(
            observer.bar.get().map(|pb| pb.message()),
            Some("Probing... (1/2 hosts)".to_string())
        );

        observer.batch_finished(2);
        assert!(observer.bar.get().is_some_and(ProgressBar::is_finished));
    }
}

//! Rendering of finished batches
//!
//! Captured batches are printed as a per-host transcript: a header, the
//! host's stdout and stderr, then its outcome. The transcript looks the same
//! whether the batch ran sequentially or in parallel. `status` renders its
//! batch as a table instead.

use fanout::{Batch, BatchError, HostResult, Observer};
use std::io::{self, Write};

use crate::probe::StatusRow;
use crate::ui::Theme;

// ============================================================================
// Transcript
// ============================================================================

fn write_header(out: &mut impl Write, theme: &Theme, host: &str, command: &str) -> io::Result<()> {
    writeln!(
        out,
        "{} {}: {}",
        theme.header("=== Executing on"),
        theme.hostname(host),
        command
    )
}

fn write_outcome(out: &mut impl Write, theme: &Theme, result: &HostResult) -> io::Result<()> {
    match result.error() {
        Some(err) => writeln!(out, "{} {}", theme.error("=== ✗"), theme.error(&err.to_string())),
        None => writeln!(
            out,
            "{} {}",
            theme.success("=== ✓ Successfully executed on"),
            theme.hostname(result.hostname())
        ),
    }
}

fn write_stream(out: &mut impl Write, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Write one host's section of the transcript.
pub fn write_result(out: &mut impl Write, theme: &Theme, result: &HostResult) -> io::Result<()> {
    write_header(out, theme, result.hostname(), result.command())?;
    write_stream(out, result.stdout())?;
    write_stream(out, result.stderr())?;
    write_outcome(out, theme, result)
}

/// Write every result of a batch, in host order.
pub fn write_transcript(out: &mut impl Write, theme: &Theme, batch: &Batch) -> io::Result<()> {
    for result in batch {
        write_result(out, theme, result)?;
    }
    Ok(())
}

/// Print a transcript to stdout.
pub fn print_transcript(theme: &Theme, batch: &Batch) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_transcript(&mut out, theme, batch)?;
    out.flush()
}

/// Prints the header before each attached run and the outcome after it.
///
/// Attached runs write straight to the terminal, so the header has to go out
/// before the host starts rather than after the batch.
pub struct TranscriptObserver {
    theme: Theme,
}

impl TranscriptObserver {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Observer for TranscriptObserver {
    fn host_started(&self, host: &str, command: &str) {
        let mut out = io::stdout().lock();
        if let Err(err) = write_header(&mut out, &self.theme, host, command).and_then(|()| out.flush()) {
            log::debug!("could not write header for {host}: {err}");
        }
    }

    fn host_finished(&self, _completed: usize, _total: usize, result: &HostResult) {
        let mut out = io::stdout().lock();
        if let Err(err) = write_outcome(&mut out, &self.theme, result).and_then(|()| out.flush()) {
            log::debug!("could not write outcome for {}: {err}", result.hostname());
        }
    }
}

/// Write the failure summary for a batch, with a hint for the category of
/// the first failure.
pub fn write_failure_summary(
    out: &mut impl Write,
    theme: &Theme,
    err: &BatchError,
) -> io::Result<()> {
    let category = err.first.category();
    writeln!(out, "{} {}", theme.error("✗"), err)?;
    writeln!(
        out,
        "  {} {}",
        theme.dim(&format!("{}:", category.description())),
        category.advice()
    )
}

// ============================================================================
// Status table
// ============================================================================

const STATUS_HEADERS: [&str; 6] = ["HOSTNAME", "HOSTCLASS", "VERSION", "DISK", "MEM", "GIT"];
const GUTTER: &str = "  ";

fn cells(row: &StatusRow) -> [&str; 6] {
    [
        &row.hostname,
        &row.record.host_class,
        &row.record.config_revision,
        &row.record.disk_usage,
        &row.record.memory_usage,
        &row.record.repo_state,
    ]
}

fn column_widths(rows: &[StatusRow]) -> [usize; 6] {
    let mut widths = STATUS_HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(cells(row)) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn styled_cell(theme: &Theme, column: usize, text: &str) -> String {
    match column {
        0 => theme.hostname(text),
        3 | 4 => theme.usage(text),
        5 => theme.repo_state(text),
        _ => text.to_string(),
    }
}

/// Join cells into a line. Padding is measured on the plain text so that
/// color codes never shift the columns.
fn write_line<'a>(
    out: &mut impl Write,
    widths: &[usize; 6],
    cells: impl IntoIterator<Item = (&'a str, String)>,
) -> io::Result<()> {
    let last = widths.len() - 1;
    let mut line = String::new();
    for (column, (plain, styled)) in cells.into_iter().enumerate() {
        line.push_str(&styled);
        if column < last {
            let pad = widths[column].saturating_sub(plain.chars().count());
            line.push_str(&" ".repeat(pad));
            line.push_str(GUTTER);
        }
    }
    writeln!(out, "{}", line.trim_end())
}

/// Write the status table, one row per host in host order.
pub fn write_status_table(out: &mut impl Write, theme: &Theme, rows: &[StatusRow]) -> io::Result<()> {
    let widths = column_widths(rows);

    write_line(
        out,
        &widths,
        STATUS_HEADERS.iter().map(|h| (*h, theme.bold(h))),
    )?;

    for row in rows {
        write_line(
            out,
            &widths,
            cells(row)
                .into_iter()
                .enumerate()
                .map(|(column, text)| (text, styled_cell(theme, column, text))),
        )?;
    }
    Ok(())
}

/// Write the status rows as pretty JSON.
pub fn write_status_json(out: &mut impl Write, rows: &[StatusRow]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)
}

// ============================================================================
// Tests
// ============================================================================

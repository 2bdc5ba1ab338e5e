//! Terminal rendering
//!
//! The viewer state holds the whole log; the terminal only ever gets the part
//! that has not been printed yet. [`TerminalView`] is attached as the
//! viewer's scroll hint, so every "new output" signal prints the delta and
//! flushes stdout.

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use ctf_build_logs::{ScrollHint, SelectedLog, ViewState, ViewportError};
use ctf_core::{BuildLogSummary, BuildStatus, StyleKind};
use parking_lot::Mutex;
use std::io::Write;
use tokio::sync::watch;

/// What still has to be printed for a log
#[derive(Debug, PartialEq, Eq)]
pub enum Delta<'a> {
    Nothing,
    Append(&'a str),
    /// The log was replaced by one that does not extend what is on screen
    Restart(&'a str),
}

/// Compare what is on screen with the current log
pub fn delta<'a>(printed: Option<(&str, &str)>, log: &'a SelectedLog) -> Delta<'a> {
    match printed {
        Some((job_id, shown)) if job_id == log.job_id && log.content.starts_with(shown) => {
            let rest = &log.content[shown.len()..];
            if rest.is_empty() {
                Delta::Nothing
            } else {
                Delta::Append(rest)
            }
        }
        _ if log.content.is_empty() => Delta::Nothing,
        _ => Delta::Restart(&log.content),
    }
}

#[derive(Default)]
struct Printed {
    job_id: String,
    content: String,
}

/// Prints new log output to stdout
pub struct TerminalView {
    state: watch::Receiver<ViewState>,
    printed: Mutex<Option<Printed>>,
}

impl TerminalView {
    pub fn new(state: watch::Receiver<ViewState>) -> Self {
        Self {
            state,
            printed: Mutex::new(None),
        }
    }

    /// Print whatever part of the selected log is not on screen yet.
    ///
    /// Blocking write to stdout. Called as a scroll hint it runs on the
    /// session task; the view state is cloned out first so no watch borrow is
    /// held across the write, and each call writes at most one delta.
    pub fn render(&self) -> Result<(), ViewportError> {
        let state = self.state.borrow().clone();
        let Some(log) = state.selected_log else {
            return Ok(());
        };

        let mut printed = self.printed.lock();
        let shown = printed
            .as_ref()
            .map(|p| (p.job_id.as_str(), p.content.as_str()));

        let mut stdout = std::io::stdout().lock();
        let result = match delta(shown, &log) {
            Delta::Nothing => return Ok(()),
            Delta::Append(text) => write!(stdout, "{}", text),
            Delta::Restart(text) => {
                writeln!(stdout, "{}", format!("── {} ──", log.job_id).dimmed())
                    .and_then(|_| write!(stdout, "{}", text))
            }
        };
        result
            .and_then(|_| stdout.flush())
            .map_err(|e| ViewportError::Other(e.to_string()))?;

        *printed = Some(Printed {
            job_id: log.job_id,
            content: log.content,
        });
        Ok(())
    }
}

impl ScrollHint for TerminalView {
    fn scroll_to_latest(&self) -> Result<(), ViewportError> {
        self.render()
    }
}

pub fn status_label(status: BuildStatus) -> ColoredString {
    let class = status.classify();
    match class.style {
        StyleKind::Success => class.label.green(),
        StyleKind::Failed => class.label.red(),
        StyleKind::Building => class.label.yellow(),
        StyleKind::Pending => class.label.cyan(),
        StyleKind::Unknown => class.label.dimmed(),
    }
}

fn status_color(status: BuildStatus) -> Color {
    match status.classify().style {
        StyleKind::Success => Color::Green,
        StyleKind::Failed => Color::Red,
        StyleKind::Building => Color::Yellow,
        StyleKind::Pending => Color::Cyan,
        StyleKind::Unknown => Color::Grey,
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Job list as a table, in the order the platform returned it
pub fn summary_table(summaries: &[BuildLogSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Job").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
            Cell::new("Started").fg(Color::Cyan),
            Cell::new("Finished").fg(Color::Cyan),
        ]);

    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.job_id),
            Cell::new(summary.status.classify().label).fg(status_color(summary.status)),
            Cell::new(format_time(summary.created_at)),
            Cell::new(format_time(summary.completed_at)),
        ]);
    }
    table
}

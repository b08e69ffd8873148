//! Rendering of reports and listings as tables, JSON, or YAML

use colored::{ColoredString, Colorize};
use keeper_core::{ListEntry, ListState, ResourceKind, SyncReport, SyncResult, SyncStatus};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Serialize `value` for the machine-readable formats.
///
/// Returns `None` for [`OutputFormat::Table`].
pub fn render_data<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<Option<String>> {
    match format {
        OutputFormat::Table => Ok(None),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(value)?)),
        OutputFormat::Yaml => Ok(Some(serde_yaml::to_string(value)?)),
    }
}

fn kind_label(kind: ResourceKind) -> &'static str {
    kind.dir_name()
}

fn state_label(state: ListState) -> ColoredString {
    let label = format!("{:<16}", state.to_string());
    match state {
        ListState::Identical => label.green(),
        ListState::Differs => label.yellow(),
        ListState::LocalOnly => label.cyan(),
        ListState::RemoteOnly => label.blue(),
        ListState::Unknown => label.red(),
    }
}

fn status_label(status: SyncStatus) -> ColoredString {
    let label = format!("{:<10}", status.to_string());
    match status {
        SyncStatus::Created | SyncStatus::Deleted => label.green(),
        SyncStatus::Updated => label.yellow(),
        SyncStatus::Unchanged => label.dimmed(),
        SyncStatus::Absent => label.yellow(),
        SyncStatus::Failed => label.red().bold(),
    }
}

/// Table of list entries, one line per name.
pub fn list_table(entries: &[ListEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", "No matching resources.".dimmed());
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let updated = entry
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<13} {:<width$}  {} {}",
            kind_label(entry.kind),
            entry.name,
            state_label(entry.state),
            updated.dimmed(),
        ));
        if let Some(error) = &entry.error {
            out.push_str(&format!("  {}", error.red()));
        }
        out.push('\n');
    }
    out
}

fn result_line(result: &SyncResult, width: usize) -> String {
    let mut line = format!(
        "{} {:<13} {:<width$}",
        status_label(result.status),
        kind_label(result.kind),
        result.name,
    );
    if let Some(error) = &result.error {
        let error = if result.is_failure() { error.red() } else { error.dimmed() };
        line.push_str(&format!("  {}", error));
    }
    line.trim_end().to_string()
}

/// One-line tally, e.g. "2 created, 1 unchanged, 1 failed".
pub fn summary(report: &SyncReport) -> String {
    let counts: Vec<String> = [
        SyncStatus::Created,
        SyncStatus::Updated,
        SyncStatus::Unchanged,
        SyncStatus::Deleted,
        SyncStatus::Absent,
        SyncStatus::Failed,
    ]
    .into_iter()
    .filter_map(|status| {
        let count = report.count(status);
        (count > 0).then(|| format!("{} {}", count, status))
    })
    .collect();

    if counts.is_empty() {
        "nothing selected".to_string()
    } else {
        counts.join(", ")
    }
}

/// Table of per-item results followed by a summary line.
pub fn report_table(report: &SyncReport, action: &str, dry_run: bool) -> String {
    let width = report.results().iter().map(|r| r.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for result in report.results() {
        out.push_str(&result_line(result, width));
        out.push('\n');
    }

    let prefix = if dry_run {
        format!("{} ", "(dry run)".yellow())
    } else {
        String::new()
    };
    let marker = if report.has_failures() {
        "!!".red().bold()
    } else {
        "OK".green().bold()
    };
    out.push_str(&format!("{} {}{}: {}\n", marker, prefix, action, summary(report)));
    out
}

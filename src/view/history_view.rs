use crate::document_model::{ChangeKind, HistoryListing};
use chrono::{DateTime, Local, Utc};
use crossterm::style::Stylize;
use std::fmt::Write;

pub fn format_timestamp(timestamp: u64) -> String {
    let time = i64::try_from(timestamp)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis);
    match time {
        Some(time) => time
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("@{timestamp}"),
    }
}

fn change_marker(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "+",
        ChangeKind::Removed => "-",
        ChangeKind::Modified => "~",
        ChangeKind::None => " ",
    }
}

/// Render a history listing, one entry per line. With `color` the change
/// summaries are styled: added green, removed red, modified yellow.
pub fn render_history(listing: &[HistoryListing], color: bool) -> String {
    let mut out = String::new();
    if listing.is_empty() {
        out.push_str("No history\n");
        return out;
    }

    for row in listing {
        let current = if row.is_current { "*" } else { " " };
        let marker = change_marker(row.summary.kind);
        let summary = format!("{} {}", marker, row.summary.text);

        let summary = if color {
            match row.summary.kind {
                ChangeKind::Added => summary.green().to_string(),
                ChangeKind::Removed => summary.red().to_string(),
                ChangeKind::Modified => summary.yellow().to_string(),
                ChangeKind::None => summary.dark_grey().to_string(),
            }
        } else {
            summary
        };

        let _ = writeln!(
            out,
            "{}{:>3}  {}  {}",
            current,
            row.index,
            format_timestamp(row.timestamp),
            summary
        );
    }
    out
}

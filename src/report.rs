#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Terminal summaries shown to the operator.

use tabled::{
    Table,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{grade::BatchResult, mail::DeliveryReport};

/// Incomplete rows listed before the rest are elided.
pub const INCOMPLETE_SHOWN: usize = 10;
/// Unmatched names listed before the rest are elided.
pub const UNMATCHED_SHOWN: usize = 5;

/// Wraps a table the same way for every summary.
fn styled(table: &mut Table, header: String, footer: String) -> String {
    table
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(32).keep_words(true)))
        .with(Panel::header(header))
        .with(Panel::footer(footer))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

/// Table of what would be sent for `module`.
pub fn preview_table(module: &str, result: &BatchResult, excerpt_len: usize) -> String {
    let previews = result.previews(excerpt_len);
    styled(
        &mut Table::new(&previews),
        format!("Email preview for {module}"),
        format!(
            "{} to send, {} incomplete, {} without an email address",
            result.counts.sendable, result.counts.incomplete, result.counts.unmatched
        ),
    )
}

/// Lists skipped rows: the first few incomplete rows with their reasons, then
/// the first few unmatched names. Empty when nothing was skipped.
pub fn skip_summary(result: &BatchResult) -> String {
    let mut lines = Vec::new();

    if !result.skipped_incomplete.is_empty() {
        lines.push(format!(
            "Skipped {} incomplete record(s):",
            result.skipped_incomplete.len()
        ));
        for skipped in result.skipped_incomplete.iter().take(INCOMPLETE_SHOWN) {
            lines.push(format!("  - {}: {}", skipped.record.name, skipped.reason));
        }
        if let Some(rest) = result.skipped_incomplete.len().checked_sub(INCOMPLETE_SHOWN)
            && rest > 0
        {
            lines.push(format!("  ... and {rest} more"));
        }
    }

    if !result.skipped_unmatched.is_empty() {
        lines.push(format!(
            "Skipped {} record(s) with no roster email:",
            result.skipped_unmatched.len()
        ));
        for record in result.skipped_unmatched.iter().take(UNMATCHED_SHOWN) {
            lines.push(format!("  - {}", record.name));
        }
        if let Some(rest) = result.skipped_unmatched.len().checked_sub(UNMATCHED_SHOWN)
            && rest > 0
        {
            lines.push(format!("  ... and {rest} more"));
        }
    }

    lines.join("\n")
}

/// One line tallying a delivery run.
pub fn delivery_line(report: &DeliveryReport) -> String {
    format!(
        "Sent {} of {} email(s), {} failed",
        report.sent_count(),
        report.attempted(),
        report.failed_count()
    )
}

/// Failures table, or `None` when everything was delivered.
pub fn failure_table(report: &DeliveryReport) -> Option<String> {
    if report.failed.is_empty() {
        return None;
    }
    Some(styled(
        &mut Table::new(&report.failed),
        "Failed deliveries".to_string(),
        delivery_line(report),
    ))
}

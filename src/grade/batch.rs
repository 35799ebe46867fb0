#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;
use tabled::Tabled;

use super::{
    classify::{Classification, PassStatus, SkipReason, classify},
    matcher::{MatchTier, match_name},
    record::{GradingRecord, RosterEntry},
    render::{RenderError, RenderedEmail, render},
};

/// A record that will be emailed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendableEntry {
    /// Source row.
    pub record: GradingRecord,
    /// Pass/fail status shown in the report.
    pub status: PassStatus,
    /// Rendered report.
    pub email:  RenderedEmail,
    /// Matching tier that found the address.
    pub tier:   MatchTier,
}

/// A record skipped because it is not ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedIncomplete {
    /// Source row.
    pub record: GradingRecord,
    /// First reason that applied.
    pub reason: SkipReason,
}

/// Tallies for one module run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchCounts {
    /// Input rows.
    pub total:      usize,
    /// Rows ready to send.
    pub sendable:   usize,
    /// Rows skipped as incomplete.
    pub incomplete: usize,
    /// Complete rows with no roster match.
    pub unmatched:  usize,
}

/// Partition of one module's rows. Every input row lands in exactly one list
/// and each list keeps input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchResult {
    /// Rows ready to send.
    pub sendable:           Vec<SendableEntry>,
    /// Rows skipped as incomplete.
    pub skipped_incomplete: Vec<SkippedIncomplete>,
    /// Complete rows with no roster match.
    pub skipped_unmatched:  Vec<GradingRecord>,
    /// Tallies.
    pub counts:             BatchCounts,
}

/// What the operator sees for one sendable entry before approving a send.
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize)]
pub struct Preview {
    #[tabled(rename = "#")]
    /// 1-based position in the send order.
    pub position:       usize,
    #[tabled(rename = "Student")]
    /// Recipient display name.
    pub recipient_name: String,
    #[tabled(rename = "Email")]
    /// Recipient address.
    pub recipient:      String,
    #[tabled(rename = "Subject")]
    /// Subject line.
    pub subject:        String,
    #[tabled(rename = "Preview")]
    /// Leading part of the plain body.
    pub excerpt:        String,
}

impl BatchResult {
    /// Preview rows, excerpts cut to `excerpt_len` characters.
    pub fn previews(&self, excerpt_len: usize) -> Vec<Preview> {
        self.sendable
            .iter()
            .enumerate()
            .map(|(i, entry)| Preview {
                position:       i + 1,
                recipient_name: entry.email.recipient_name.clone(),
                recipient:      entry.email.recipient.clone(),
                subject:        entry.email.subject.clone(),
                excerpt:        entry.email.excerpt(excerpt_len),
            })
            .collect()
    }

    /// Rendered emails in send order.
    pub fn emails(&self) -> impl Iterator<Item = &RenderedEmail> {
        self.sendable.iter().map(|entry| &entry.email)
    }
}

/// Classifies, matches, and renders every row of one module sheet.
///
/// Incomplete and unmatched rows are skips, not errors. A [`RenderError`]
/// here means a row reached the renderer without passing those filters.
pub fn run_module(
    records: &[GradingRecord],
    roster: &[RosterEntry],
    passing_threshold: f64,
) -> Result<BatchResult, RenderError> {
    let mut result = BatchResult::default();

    for record in records {
        let classification = classify(record, passing_threshold);
        let status = match classification {
            Classification::Complete { status, .. } => status,
            Classification::Incomplete(reason) => {
                tracing::debug!("Skipping `{}`: {reason}", record.name);
                result.skipped_incomplete.push(SkippedIncomplete {
                    record: record.clone(),
                    reason,
                });
                continue;
            }
        };

        let matched = match_name(&record.name, roster);
        let Some(address) = matched.email.as_deref() else {
            tracing::debug!("No roster entry for `{}`", record.name);
            result.skipped_unmatched.push(record.clone());
            continue;
        };

        let email = render(record, &classification, Some(address))?;
        result.sendable.push(SendableEntry {
            record: record.clone(),
            status,
            email,
            tier: matched.tier,
        });
    }

    result.counts = BatchCounts {
        total:      records.len(),
        sendable:   result.sendable.len(),
        incomplete: result.skipped_incomplete.len(),
        unmatched:  result.skipped_unmatched.len(),
    };

    tracing::info!(
        "Processed {} records: {} to send, {} incomplete, {} without an email address",
        result.counts.total,
        result.counts.sendable,
        result.counts.incomplete,
        result.counts.unmatched
    );

    Ok(result)
}

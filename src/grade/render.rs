#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;
use thiserror::Error;

use super::{
    classify::{Classification, PassStatus, SkipReason},
    record::GradingRecord,
};
use crate::constants::{
    CLOSING_LINE, NEEDS_REDO_COLOR, PASSED_COLOR, RUBRIC_MAX_SCORE, SIGNATURE_FOOTER,
    SIGNATURE_NAME, WARNING_COLOR,
};

/// Raised when the renderer is handed a record that should have been
/// filtered out before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The record was classified as incomplete.
    #[error("Cannot render a report for an incomplete record ({0}).")]
    Incomplete(SkipReason),
    /// No recipient address was supplied.
    #[error("Cannot render a report for `{0}` without a recipient address.")]
    MissingRecipient(String),
}

/// A fully rendered report, ready to preview or send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    /// Display name of the recipient.
    pub recipient_name: String,
    /// Recipient address.
    pub recipient:      String,
    /// Subject line.
    pub subject:        String,
    /// Plain-text body.
    pub text:           String,
    /// Rich HTML body.
    pub html:           String,
    /// Colour token for the pass/fail status.
    pub status_color:   &'static str,
}

impl RenderedEmail {
    /// The first `len` characters of the plain body, with `...` appended when
    /// something was cut.
    pub fn excerpt(&self, len: usize) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(len).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }

    /// Returns a copy addressed to someone else, with `[TEST]` appended to
    /// the subject.
    pub fn as_test(&self, recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            subject: format!("{} [TEST]", self.subject),
            ..self.clone()
        }
    }
}

/// English ordinal for a positive number: `1st`, `2nd`, `3rd`, `11th`, ...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Whole numbers print without decimals.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{score}")
    }
}

/// Rounded percentage of a fraction.
fn percent(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

/// Escapes text for use inside HTML element content.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped feedback text with line breaks preserved.
fn html_paragraph(text: &str) -> String {
    escape_html(text.trim()).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Bar colour for a rubric score.
fn bar_color(score: f64) -> &'static str {
    if score >= 4.0 {
        PASSED_COLOR
    } else if score >= 3.0 {
        WARNING_COLOR
    } else {
        NEEDS_REDO_COLOR
    }
}

/// One HTML table row per rubric category.
fn rubric_rows(record: &GradingRecord) -> String {
    record
        .rubric
        .iter()
        .map(|r| {
            let (value, width, color) = match r.score {
                Some(s) => (
                    format_score(s),
                    ((s / RUBRIC_MAX_SCORE) * 100.0).clamp(0.0, 100.0) as i64,
                    bar_color(s),
                ),
                None => ("-".to_string(), 0, NEEDS_REDO_COLOR),
            };
            format!(
                concat!(
                    "<tr>",
                    "<td style=\"padding: 12px; border-bottom: 1px solid #e9ecef;\">{category}</td>",
                    "<td style=\"padding: 12px; border-bottom: 1px solid #e9ecef; text-align: center; \
                     font-weight: bold;\">{value}</td>",
                    "<td style=\"padding: 12px; border-bottom: 1px solid #e9ecef;\">",
                    "<div style=\"background-color: #e9ecef; border-radius: 10px; height: 10px; \
                     overflow: hidden;\">",
                    "<div style=\"background-color: {color}; width: {width}%; height: 100%;\"></div>",
                    "</div></td></tr>\n",
                ),
                category = escape_html(&r.category),
                value = value,
                color = color,
                width = width,
            )
        })
        .collect()
}

/// Plain-text rubric listing, one `category: score` line each.
fn rubric_lines(record: &GradingRecord) -> String {
    record
        .rubric
        .iter()
        .map(|r| {
            let value = r.score.map(format_score).unwrap_or_else(|| "-".to_string());
            format!("{}: {value}\n", r.category)
        })
        .collect()
}

/// Builds the subject and both bodies for one complete, matched record.
///
/// Pure: identical inputs give byte-identical output.
pub fn render(
    record: &GradingRecord,
    classification: &Classification,
    email: Option<&str>,
) -> Result<RenderedEmail, RenderError> {
    let (status, threshold): (PassStatus, f64) = match classification {
        Classification::Complete { status, threshold } => (*status, *threshold),
        Classification::Incomplete(reason) => return Err(RenderError::Incomplete(*reason)),
    };
    let recipient = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| RenderError::MissingRecipient(record.name.clone()))?;

    let total = record.total_score.unwrap_or_default();
    let name = record.name.trim();
    let attempt = ordinal(record.attempt);
    let redo = if record.redo_required { "Yes" } else { "No" };
    let total_fraction = format!("{total:.2}");
    let passing_fraction = format!("{threshold:.2}");

    let subject = format!("Lab Grade: {} - {}", record.assignment(), status.label());

    let text = format!(
        include_str!("templates/report.txt"),
        name = name,
        status = status.label(),
        total_fraction = total_fraction,
        score_percent = percent(total),
        passing_fraction = passing_fraction,
        passing_percent = percent(threshold),
        attempt = attempt,
        redo = redo,
        plagiarism = record.plagiarism,
        rubric = rubric_lines(record),
        strengths = record.strengths.trim(),
        gaps = record.gaps.trim(),
        remarks = record.remarks.trim(),
        closing = CLOSING_LINE,
        signature = SIGNATURE_NAME,
    );

    let html = format!(
        include_str!("templates/report.html"),
        assignment = escape_html(record.assignment()),
        name = escape_html(name),
        status = status.label(),
        status_color = status.color(),
        status_background = status.background(),
        status_icon = status.icon(),
        score_percent = percent(total),
        total_fraction = total_fraction,
        passing_fraction = passing_fraction,
        passing_percent = percent(threshold),
        attempt = attempt,
        redo = redo,
        plagiarism = record.plagiarism,
        rubric_rows = rubric_rows(record),
        strengths = html_paragraph(&record.strengths),
        gaps = html_paragraph(&record.gaps),
        remarks = html_paragraph(&record.remarks),
        closing = CLOSING_LINE,
        signature = SIGNATURE_NAME,
        footer = SIGNATURE_FOOTER,
    );

    Ok(RenderedEmail {
        recipient_name: name.to_string(),
        recipient: recipient.to_string(),
        subject,
        text,
        html,
        status_color: status.color(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 101, 111, 112]
            .into_iter()
            .map(ordinal)
            .collect();
        assert_eq!(got, [
            "1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "101st",
            "111th", "112th"
        ]);
    }

    #[test]
    fn scores_drop_trailing_zero() {
        assert_eq!(format_score(4.0), "4");
        assert_eq!(format_score(3.5), "3.5");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
    }

    #[test]
    fn percent_rounds_instead_of_truncating() {
        assert_eq!(percent(0.29), 29);
        assert_eq!(percent(0.86), 86);
    }
}

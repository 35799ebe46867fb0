#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::Serialize;

use super::record::GradingRecord;
use crate::constants::{
    NEEDS_REDO_BACKGROUND, NEEDS_REDO_COLOR, PASSED_BACKGROUND, PASSED_COLOR,
};

/// Whether a record can be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Eligible to send.
    Complete,
    /// Skipped.
    Incomplete,
}

/// Why a record was skipped. Evaluated in declaration order; the first that
/// applies is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Total score missing or zero.
    NoScore,
    /// No rubric category has a non-zero score.
    NoRubricScores,
    /// Both strengths and gaps are blank.
    NoFeedbackText,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoScore => write!(f, "no score"),
            Self::NoRubricScores => write!(f, "no rubric scores"),
            Self::NoFeedbackText => write!(f, "no feedback text"),
        }
    }
}

/// Pass/fail status of a complete record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassStatus {
    /// Total score at or above the threshold.
    Passed,
    /// Total score below the threshold.
    NeedsRedo,
}

impl PassStatus {
    /// Human-readable status used in subjects and badges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::NeedsRedo => "NEEDS RE-DO",
        }
    }

    /// Colour token for the rich body.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Passed => PASSED_COLOR,
            Self::NeedsRedo => NEEDS_REDO_COLOR,
        }
    }

    /// Background tint for the status badge.
    pub fn background(&self) -> &'static str {
        match self {
            Self::Passed => PASSED_BACKGROUND,
            Self::NeedsRedo => NEEDS_REDO_BACKGROUND,
        }
    }

    /// Badge icon.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Passed => "&#10003;",
            Self::NeedsRedo => "&#10007;",
        }
    }
}

impl Display for PassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Classification {
    /// The record can be sent.
    Complete {
        /// Pass/fail status.
        status:    PassStatus,
        /// Threshold the status was decided against.
        threshold: f64,
    },
    /// The record is skipped.
    Incomplete(SkipReason),
}

impl Classification {
    /// Complete or incomplete.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Complete { .. } => Outcome::Complete,
            Self::Incomplete(_) => Outcome::Incomplete,
        }
    }

    /// Present iff the record is incomplete.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Incomplete(reason) => Some(*reason),
            Self::Complete { .. } => None,
        }
    }

    /// Present iff the record is complete.
    pub fn status(&self) -> Option<PassStatus> {
        match self {
            Self::Complete { status, .. } => Some(*status),
            Self::Incomplete(_) => None,
        }
    }

    /// Whether the record can be sent.
    pub fn is_complete(&self) -> bool {
        self.outcome() == Outcome::Complete
    }
}

/// Decides whether `record` is complete and, if so, whether it passed.
///
/// A score equal to `passing_threshold` passes.
pub fn classify(record: &GradingRecord, passing_threshold: f64) -> Classification {
    let total = match record.total_score {
        Some(score) if score != 0.0 => score,
        _ => return Classification::Incomplete(SkipReason::NoScore),
    };

    if !record.rubric.has_nonzero_score() {
        return Classification::Incomplete(SkipReason::NoRubricScores);
    }

    if record.strengths.trim().is_empty() && record.gaps.trim().is_empty() {
        return Classification::Incomplete(SkipReason::NoFeedbackText);
    }

    let status = if total >= passing_threshold {
        PassStatus::Passed
    } else {
        PassStatus::NeedsRedo
    };

    Classification::Complete {
        status,
        threshold: passing_threshold,
    }
}

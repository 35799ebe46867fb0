#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use serde::{Deserialize, Serialize};

/// Outcome of the plagiarism check recorded on a grading row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlagiarismResult {
    /// The submission passed the check.
    Passed,
    /// The submission was flagged.
    Flagged,
    /// No check was recorded.
    #[default]
    NotChecked,
}

impl PlagiarismResult {
    /// Interprets a free-form sheet cell.
    pub fn from_cell(cell: &str) -> Self {
        match cell.trim().to_ascii_lowercase().as_str() {
            "passed" | "pass" | "clear" | "ok" | "no" => Self::Passed,
            "flagged" | "fail" | "failed" | "yes" | "detected" => Self::Flagged,
            _ => Self::NotChecked,
        }
    }
}

impl Display for PlagiarismResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "Passed"),
            Self::Flagged => write!(f, "Flagged"),
            Self::NotChecked => write!(f, "Not Checked"),
        }
    }
}

/// A single graded sub-criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    /// Category name as it appears in the sheet header.
    pub category: String,
    /// Score, if the cell held a number.
    pub score:    Option<f64>,
}

/// Ordered rubric scores for one record. The category set is whatever the
/// module sheet carries, in sheet order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RubricScores(Vec<RubricScore>);

impl RubricScores {
    /// Creates an empty rubric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a category, keeping insertion order.
    pub fn push(&mut self, category: impl Into<String>, score: Option<f64>) {
        self.0.push(RubricScore {
            category: category.into(),
            score,
        });
    }

    /// Iterates categories in their original order.
    pub fn iter(&self) -> impl Iterator<Item = &RubricScore> {
        self.0.iter()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the rubric has no categories at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any category has a present, non-zero score.
    pub fn has_nonzero_score(&self) -> bool {
        self.0
            .iter()
            .any(|r| r.score.is_some_and(|s| s != 0.0))
    }
}

impl<C, I> FromIterator<(C, I)> for RubricScores
where
    C: Into<String>,
    I: Into<Option<f64>>,
{
    fn from_iter<T: IntoIterator<Item = (C, I)>>(iter: T) -> Self {
        let mut rubric = Self::new();
        for (category, score) in iter {
            rubric.push(category, score.into());
        }
        rubric
    }
}

/// One row of a module grading sheet.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct GradingRecord {
    /// Student display name as written by the reviewer.
    pub name:          String,
    /// Module (sheet) the row belongs to.
    pub module:        String,
    /// Title of the lab, if the sheet carries one.
    pub lab_title:     Option<String>,
    /// Reviewer who graded the lab.
    pub reviewer:      Option<String>,
    /// Total score as a fraction in `0.0..=1.0`.
    pub total_score:   Option<f64>,
    /// Per-category scores.
    #[builder(default)]
    pub rubric:        RubricScores,
    /// Attempt number, starting at 1.
    #[builder(default = 1)]
    pub attempt:       u32,
    /// Whether the reviewer asked for a re-do.
    #[builder(default)]
    pub redo_required: bool,
    /// Plagiarism check outcome.
    #[builder(default)]
    pub plagiarism:    PlagiarismResult,
    /// What went well.
    #[builder(default)]
    pub strengths:     String,
    /// What needs work.
    #[builder(default)]
    pub gaps:          String,
    /// Anything else the reviewer wanted to say.
    #[builder(default)]
    pub remarks:       String,
}

impl GradingRecord {
    /// Name shown in the subject line: the lab title, falling back to the
    /// module name.
    pub fn assignment(&self) -> &str {
        self.lab_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.module)
    }
}

/// One row of the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Full display name.
    pub name:  String,
    /// Email address.
    pub email: String,
}

impl RosterEntry {
    /// Creates a roster entry.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name:  name.into(),
            email: email.into(),
        }
    }
}

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Partitioning a module sheet into sendable and skipped rows.
pub mod batch;
/// Completeness and pass/fail rules.
pub mod classify;
/// Roster name matching.
pub mod matcher;
/// Grading rows and roster entries.
pub mod record;
/// Report subject and body rendering.
pub mod render;

pub use batch::{
    BatchCounts, BatchResult, Preview, SendableEntry, SkippedIncomplete, run_module,
};
pub use classify::{Classification, Outcome, PassStatus, SkipReason, classify};
pub use matcher::{MatchResult, MatchTier, match_name, normalize};
pub use record::{GradingRecord, PlagiarismResult, RosterEntry, RubricScore, RubricScores};
pub use render::{RenderError, RenderedEmail, ordinal, render};

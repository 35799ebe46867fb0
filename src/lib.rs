//! # labsend
//!
//! Turns reviewer grading sheets into per-student lab reports and emails
//! them, after an operator has previewed and approved the batch.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Runtime settings from the environment and command line.
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Sender credential providers.
pub mod credentials;
/// Classification, matching, rendering, and batching of grading rows.
pub mod grade;
/// SMTP delivery.
pub mod mail;
/// Operator-facing summaries.
pub mod report;
/// CSV sheet and roster loading.
pub mod sheet;

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, str::FromStr, time::Duration};

use bon::Builder;

use crate::constants::{
    DEFAULT_CREDENTIALS_FILE, DEFAULT_PASSING_THRESHOLD, DEFAULT_PREAMBLE_ROWS,
    DEFAULT_PREVIEW_LENGTH,
};

/// Runtime settings, read from the environment (after `.env` is loaded) and
/// then overridden from the command line.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Settings {
    /// Directory holding one CSV per module sheet.
    #[builder(into, default = PathBuf::from("grading"))]
    grading_dir:       PathBuf,
    /// Roster CSV with `Full Name` and email columns.
    #[builder(into, default = PathBuf::from("roster.csv"))]
    roster_path:       PathBuf,
    /// Rows above the header row in each module sheet.
    #[builder(default = DEFAULT_PREAMBLE_ROWS)]
    preamble_rows:     usize,
    /// Fraction of the total score needed to pass.
    #[builder(default = DEFAULT_PASSING_THRESHOLD)]
    passing_threshold: f64,
    /// Characters of body shown in the preview.
    #[builder(default = DEFAULT_PREVIEW_LENGTH)]
    preview_length:    usize,
    /// Credential file used by the file store.
    #[builder(into, default = PathBuf::from(DEFAULT_CREDENTIALS_FILE))]
    credentials_path:  PathBuf,
    /// SMTP connection timeout.
    #[builder(default = Duration::from_secs(30))]
    smtp_timeout:      Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Settings {
    /// Reads `LABSEND_*` variables, falling back to defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            grading_dir:       read_env("LABSEND_GRADING_DIR").unwrap_or(defaults.grading_dir),
            roster_path:       read_env("LABSEND_ROSTER").unwrap_or(defaults.roster_path),
            preamble_rows:     read_env("LABSEND_PREAMBLE_ROWS").unwrap_or(defaults.preamble_rows),
            passing_threshold: read_env("LABSEND_PASSING_THRESHOLD")
                .filter(valid_threshold)
                .unwrap_or(defaults.passing_threshold),
            preview_length:    read_env("LABSEND_PREVIEW_LENGTH")
                .unwrap_or(defaults.preview_length),
            credentials_path:  read_env("LABSEND_CREDENTIALS")
                .unwrap_or(defaults.credentials_path),
            smtp_timeout:      read_env("LABSEND_SMTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.smtp_timeout),
        }
    }

    /// Directory holding the module sheets.
    pub fn grading_dir(&self) -> &std::path::Path {
        &self.grading_dir
    }

    /// Sets the module sheet directory.
    pub fn set_grading_dir(&mut self, dir: impl Into<PathBuf>) {
        self.grading_dir = dir.into();
    }

    /// Roster CSV path.
    pub fn roster_path(&self) -> &std::path::Path {
        &self.roster_path
    }

    /// Sets the roster CSV path.
    pub fn set_roster_path(&mut self, path: impl Into<PathBuf>) {
        self.roster_path = path.into();
    }

    /// Rows above the header row.
    pub fn preamble_rows(&self) -> usize {
        self.preamble_rows
    }

    /// Sets the rows above the header row.
    pub fn set_preamble_rows(&mut self, rows: usize) {
        self.preamble_rows = rows;
    }

    /// Passing threshold.
    pub fn passing_threshold(&self) -> f64 {
        self.passing_threshold
    }

    /// Sets the passing threshold; values outside `0.0..=1.0` are ignored.
    pub fn set_passing_threshold(&mut self, threshold: f64) {
        if valid_threshold(&threshold) {
            self.passing_threshold = threshold;
        } else {
            tracing::warn!(
                "Ignoring passing threshold {threshold}; keeping {}",
                self.passing_threshold
            );
        }
    }

    /// Preview excerpt length.
    pub fn preview_length(&self) -> usize {
        self.preview_length
    }

    /// Sets the preview excerpt length.
    pub fn set_preview_length(&mut self, len: usize) {
        self.preview_length = len;
    }

    /// Credential file path.
    pub fn credentials_path(&self) -> &std::path::Path {
        &self.credentials_path
    }

    /// SMTP connection timeout.
    pub fn smtp_timeout(&self) -> Duration {
        self.smtp_timeout
    }
}

/// A threshold must be a fraction.
fn valid_threshold(value: &f64) -> bool {
    (0.0..=1.0).contains(value)
}

/// Parses an environment variable, treating blank or malformed values as
/// unset.
fn read_env<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<T>().ok())
}

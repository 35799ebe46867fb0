#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Fraction of the total score needed to pass a lab when nothing else is
/// configured.
pub const DEFAULT_PASSING_THRESHOLD: f64 = 0.8;

/// Number of characters of the plain body shown in the operator preview.
pub const DEFAULT_PREVIEW_LENGTH: usize = 150;

/// Rows above the header row in an exported module sheet (allocated points,
/// passing score, attempt weights).
pub const DEFAULT_PREAMBLE_ROWS: usize = 3;

/// Highest score a single rubric category can receive; used to size the
/// progress bars in the HTML report.
pub const RUBRIC_MAX_SCORE: f64 = 5.0;

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default file used by the credential store.
pub const DEFAULT_CREDENTIALS_FILE: &str = ".email_config.json";

/// Status colour for a passing report.
pub const PASSED_COLOR: &str = "#28a745";

/// Status colour for a report that needs a re-do.
pub const NEEDS_REDO_COLOR: &str = "#dc3545";

/// Badge background for a passing report.
pub const PASSED_BACKGROUND: &str = "#d4edda";

/// Badge background for a report that needs a re-do.
pub const NEEDS_REDO_BACKGROUND: &str = "#f8d7da";

/// Rubric bar colour for a middling score.
pub const WARNING_COLOR: &str = "#ffc107";

/// Closing line of every report.
pub const CLOSING_LINE: &str =
    "If you have any questions about your grade, please reach out during office hours.";

/// Name used in the signature block of every report.
pub const SIGNATURE_NAME: &str = "The Lab Grading Team";

/// Footer shown at the very bottom of the HTML report.
pub const SIGNATURE_FOOTER: &str = "Lab Grading System";

/// Column headers of a module sheet that are not rubric categories.
pub mod columns {
    /// Date the lab was reviewed.
    pub const REVIEW_DATE: &str = "Review Date";
    /// Student display name.
    pub const NAME: &str = "Name of NSP";
    /// Reviewer who graded the lab.
    pub const REVIEWER: &str = "Reviewer";
    /// Title of the lab.
    pub const LAB_TITLE: &str = "Lab Title";
    /// Attempt number.
    pub const ATTEMPT: &str = "Attempt";
    /// Total score as a fraction.
    pub const TOTAL_SCORE: &str = "Total Score";
    /// Whether a re-do is required.
    pub const REDO: &str = "Re-do Lab";
    /// Plagiarism check result.
    pub const PLAGIARISM: &str = "Plagiarism Check";
    /// Strengths feedback.
    pub const STRENGTHS: &str = "Remarks: Strengths";
    /// Gaps feedback.
    pub const GAPS: &str = "Remarks: Gaps";
    /// Any other remarks.
    pub const OTHER_REMARKS: &str = "Other Remarks";

    /// Every known non-rubric column.
    pub const KNOWN: [&str; 11] = [
        REVIEW_DATE,
        NAME,
        REVIEWER,
        LAB_TITLE,
        ATTEMPT,
        TOTAL_SCORE,
        REDO,
        PLAGIARISM,
        STRENGTHS,
        GAPS,
        OTHER_REMARKS,
    ];

    /// Roster column holding the full name.
    pub const ROSTER_NAME: &str = "Full Name";
    /// Preferred roster column holding the email address.
    pub const ROSTER_EMAIL: &str = "Email";
}

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Loading grading sheets and the roster from CSV exports.
//!
//! A grading workbook is a directory with one CSV per module sheet. Each
//! sheet opens with a few preamble rows (allocated points, passing score,
//! attempt weights) before the header row. Any header that is not one of
//! [`columns::KNOWN`] is a rubric category, kept in column order.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord};
use glob::glob;
use thiserror::Error;

use crate::{
    constants::columns,
    grade::{GradingRecord, PlagiarismResult, RosterEntry, RubricScores},
};

/// Errors raised while reading sheets.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The sheet file does not exist.
    #[error("Could not find sheet `{0}`.")]
    NotFound(PathBuf),
    /// A required column is missing from the header row.
    #[error("Sheet `{path}` has no `{column}` column.")]
    MissingColumn {
        /// Sheet path.
        path:   PathBuf,
        /// Missing column.
        column: String,
    },
    /// The header row was never reached.
    #[error("Sheet `{0}` ends before its header row.")]
    NoHeader(PathBuf),
    /// The CSV could not be read.
    #[error("Could not read `{path}`: {source}")]
    Csv {
        /// Sheet path.
        path:   PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
    /// The module directory could not be searched.
    #[error("Could not search for module sheets: {0}")]
    Pattern(String),
}

/// Parses a score cell into a fraction. Accepts `0.86`, `86%`, and whole
/// percentages such as `86`.
pub fn parse_score(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if let Some(pct) = cell.strip_suffix('%') {
        return pct
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .map(|p| p / 100.0);
    }
    let value = cell.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(if value > 1.0 { value / 100.0 } else { value })
}

/// Parses a rubric cell. Non-numeric text counts as missing.
fn parse_rubric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the leading digits of an attempt cell (`2`, `2nd`, `2.0`),
/// defaulting to the first attempt.
pub fn parse_attempt(cell: &str) -> u32 {
    let digits: String = cell
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|n| *n > 0).unwrap_or(1)
}

/// Interprets a yes/no cell.
pub fn parse_flag(cell: &str) -> bool {
    matches!(cell.trim().to_ascii_lowercase().as_str(), "yes" | "y" | "true" | "1")
}

/// Opens a CSV that may have ragged rows and no header of its own.
fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, SheetError> {
    if !path.exists() {
        return Err(SheetError::NotFound(path.to_path_buf()));
    }
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| SheetError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Header row of a module sheet, split into known columns and rubric
/// categories.
struct Layout {
    /// Known column name to index.
    known:  HashMap<&'static str, usize>,
    /// Rubric category name and index, in sheet order.
    rubric: Vec<(String, usize)>,
}

impl Layout {
    /// Reads the column positions out of the header row.
    fn from_header(header: &StringRecord) -> Self {
        let mut known = HashMap::new();
        let mut rubric = Vec::new();
        for (i, cell) in header.iter().enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match columns::KNOWN.iter().find(|k| k.eq_ignore_ascii_case(cell)) {
                Some(k) => {
                    known.entry(*k).or_insert(i);
                }
                None => rubric.push((cell.to_string(), i)),
            }
        }
        Self { known, rubric }
    }

    /// Trimmed cell for a known column, or `""`.
    fn cell<'r>(&self, row: &'r StringRecord, column: &str) -> &'r str {
        self.known
            .get(column)
            .and_then(|i| row.get(*i))
            .map(str::trim)
            .unwrap_or("")
    }

    /// Non-empty cell for a known column.
    fn optional(&self, row: &StringRecord, column: &str) -> Option<String> {
        Some(self.cell(row, column))
            .filter(|c| !c.is_empty())
            .map(String::from)
    }

    /// Maps one data row to a record.
    fn record(&self, module: &str, row: &StringRecord) -> GradingRecord {
        let rubric: RubricScores = self
            .rubric
            .iter()
            .map(|(category, i)| (category.clone(), row.get(*i).and_then(parse_rubric)))
            .collect();

        GradingRecord {
            name: self.cell(row, columns::NAME).to_string(),
            module: module.to_string(),
            lab_title: self.optional(row, columns::LAB_TITLE),
            reviewer: self.optional(row, columns::REVIEWER),
            total_score: parse_score(self.cell(row, columns::TOTAL_SCORE)),
            rubric,
            attempt: parse_attempt(self.cell(row, columns::ATTEMPT)),
            redo_required: parse_flag(self.cell(row, columns::REDO)),
            plagiarism: PlagiarismResult::from_cell(self.cell(row, columns::PLAGIARISM)),
            strengths: self.cell(row, columns::STRENGTHS).to_string(),
            gaps: self.cell(row, columns::GAPS).to_string(),
            remarks: self.cell(row, columns::OTHER_REMARKS).to_string(),
        }
    }
}

/// Loads one module sheet.
///
/// * `path`: CSV export of the sheet
/// * `module`: module name recorded on every row
/// * `preamble_rows`: rows above the header row
///
/// Rows with a blank name are dropped.
pub fn load_grading_sheet(
    path: &Path,
    module: &str,
    preamble_rows: usize,
) -> Result<Vec<GradingRecord>, SheetError> {
    let csv_err = |source: csv::Error| SheetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rows = reader(path)?.into_records().skip(preamble_rows);

    let header = rows
        .next()
        .ok_or_else(|| SheetError::NoHeader(path.to_path_buf()))?
        .map_err(csv_err)?;
    let layout = Layout::from_header(&header);
    if !layout.known.contains_key(columns::NAME) {
        return Err(SheetError::MissingColumn {
            path:   path.to_path_buf(),
            column: columns::NAME.to_string(),
        });
    }

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(csv_err)?;
        if layout.cell(&row, columns::NAME).is_empty() {
            continue;
        }
        records.push(layout.record(module, &row));
    }

    tracing::info!("Loaded {} grading records from {}", records.len(), path.display());
    Ok(records)
}

/// Loads the roster. The header row needs `Full Name` and an email column:
/// `Email` when present, otherwise the first header mentioning "email".
/// Rows missing either cell are dropped.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, SheetError> {
    let csv_err = |source: csv::Error| SheetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rows = reader(path)?.into_records();
    let header = rows
        .next()
        .ok_or_else(|| SheetError::NoHeader(path.to_path_buf()))?
        .map_err(csv_err)?;

    let position = |pred: &dyn Fn(&str) -> bool| header.iter().position(|h| pred(h.trim()));
    let missing = |column: &str| SheetError::MissingColumn {
        path:   path.to_path_buf(),
        column: column.to_string(),
    };

    let name_col = position(&|h| h.eq_ignore_ascii_case(columns::ROSTER_NAME))
        .ok_or_else(|| missing(columns::ROSTER_NAME))?;
    let email_col = position(&|h| h.eq_ignore_ascii_case(columns::ROSTER_EMAIL))
        .or_else(|| position(&|h| h.to_ascii_lowercase().contains("email")))
        .ok_or_else(|| missing(columns::ROSTER_EMAIL))?;

    let mut roster = Vec::new();
    for row in rows {
        let row = row.map_err(csv_err)?;
        let name = row.get(name_col).map(str::trim).unwrap_or("");
        let email = row.get(email_col).map(str::trim).unwrap_or("");
        if name.is_empty() || email.is_empty() {
            continue;
        }
        roster.push(RosterEntry::new(name, email));
    }

    tracing::info!("Loaded {} roster entries from {}", roster.len(), path.display());
    Ok(roster)
}

/// Module sheet names (file stems) found in `grading_dir`, sorted.
pub fn list_modules(grading_dir: &Path) -> Result<Vec<String>, SheetError> {
    let pattern = grading_dir.join("*.csv");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| SheetError::Pattern(format!("{} is not valid UTF-8", pattern.display())))?;

    let mut modules: Vec<String> = glob(pattern)
        .map_err(|e| SheetError::Pattern(e.to_string()))?
        .filter_map(Result::ok)
        .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    modules.sort();
    Ok(modules)
}

/// Path of a module's sheet inside `grading_dir`.
pub fn module_path(grading_dir: &Path, module: &str) -> PathBuf {
    grading_dir.join(format!("{module}.csv"))
}

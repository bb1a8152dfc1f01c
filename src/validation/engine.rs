//! Validation Engine
//!
//! Admission checks for new ranges and audits of whole workbooks.
//! Nothing in here mutates its inputs.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::range::{Bounds, Range, RangeProposal};
use crate::workbook::Workbook;

/// Why a proposed range was rejected. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A start coordinate is after its end coordinate
    #[error("Invalid range: start values must be less than or equal to end values")]
    InvalidBounds,
    /// A start coordinate is below zero
    #[error("Invalid range: row and column values must be non-negative")]
    NegativeCoordinate,
    /// Overlaps committed ranges on the same sheet, in collection order
    #[error("Range overlaps with existing range(s): {}", range_names(.conflicting))]
    Conflict { conflicting: Vec<Range> },
}

fn range_names(ranges: &[Range]) -> String {
    ranges
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of validating a proposed range
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub error: Option<RangeError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { error: None }
    }

    pub fn rejected(error: RangeError) -> Self {
        Self { error: Some(error) }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Committed ranges the proposal would overlap; empty unless rejected for a conflict
    pub fn conflicting_ranges(&self) -> &[Range] {
        match &self.error {
            Some(RangeError::Conflict { conflicting }) => conflicting,
            _ => &[],
        }
    }

    /// Human-readable reason, present on every rejection
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn into_result(self) -> Result<(), RangeError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Whether two ranges cover at least one common cell
pub fn ranges_overlap(a: &Range, b: &Range) -> bool {
    a.bounds().overlaps(&b.bounds())
}

/// Validate a proposed range against every committed range.
///
/// The first failing check wins: bounds order, then non-negative starts, then
/// conflicts. End coordinates are non-negative once both of the first two pass.
pub fn validate_new_range(proposal: &RangeProposal, existing: &[Range]) -> ValidationResult {
    let bounds = proposal.bounds();

    if bounds.is_inverted() {
        return ValidationResult::rejected(RangeError::InvalidBounds);
    }

    if bounds.has_negative_start() {
        return ValidationResult::rejected(RangeError::NegativeCoordinate);
    }

    let conflicting: Vec<Range> = existing
        .iter()
        .filter(|range| bounds.overlaps(&range.bounds()))
        .cloned()
        .collect();

    if !conflicting.is_empty() {
        log::debug!(
            "Range '{}' conflicts with {} committed range(s)",
            proposal.name,
            conflicting.len()
        );
        return ValidationResult::rejected(RangeError::Conflict { conflicting });
    }

    ValidationResult::valid()
}

/// Severity of a workbook diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A problem found while auditing a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Index of the sheet the problem was found on
    pub sheet_index: usize,
    pub range_id: Option<String>,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.range_id {
            Some(id) => write!(
                f,
                "{}: sheet {} range {}: {}",
                self.severity, self.sheet_index, id, self.message
            ),
            None => write!(f, "{}: sheet {}: {}", self.severity, self.sheet_index, self.message),
        }
    }
}

/// Result of auditing a workbook
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkbookReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl WorkbookReport {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add_error(&mut self, sheet_index: usize, range_id: Option<&str>, message: String) {
        self.diagnostics.push(Diagnostic {
            sheet_index,
            range_id: range_id.map(str::to_string),
            message,
            severity: Severity::Error,
        });
    }

    pub fn add_warning(&mut self, sheet_index: usize, range_id: Option<&str>, message: String) {
        self.diagnostics.push(Diagnostic {
            sheet_index,
            range_id: range_id.map(str::to_string),
            message,
            severity: Severity::Warning,
        });
    }

    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Audit every committed range of a workbook against the range invariants
pub fn validate_workbook(workbook: &Workbook) -> WorkbookReport {
    let mut report = WorkbookReport::new();
    let mut sheet_indices: HashMap<usize, &str> = HashMap::new();

    for sheet in &workbook.sheets {
        if let Some(previous) = sheet_indices.insert(sheet.index, sheet.name.as_str()) {
            report.add_error(
                sheet.index,
                None,
                format!(
                    "Sheet '{}' reuses index {} of sheet '{}'",
                    sheet.name, sheet.index, previous
                ),
            );
        }

        for range in &sheet.ranges {
            validate_committed_range(sheet.index, range, &mut report);
        }
    }

    let mut seen_ids: HashMap<&str, usize> = HashMap::new();
    for sheet in &workbook.sheets {
        for range in &sheet.ranges {
            if seen_ids.insert(range.id.as_str(), sheet.index).is_some() {
                report.add_error(
                    sheet.index,
                    Some(&range.id),
                    format!("Duplicate range id '{}'", range.id),
                );
            }
        }
    }

    let all_ranges: Vec<(usize, &Range)> = workbook
        .sheets
        .iter()
        .flat_map(|sheet| sheet.ranges.iter().map(move |r| (sheet.index, r)))
        .collect();

    // Compared on the sheet each range is stored on, not the one it claims
    for (i, (earlier_sheet, earlier)) in all_ranges.iter().enumerate() {
        let earlier_bounds = stored_bounds(*earlier_sheet, earlier);
        for (sheet_index, later) in &all_ranges[i + 1..] {
            if earlier_bounds.overlaps(&stored_bounds(*sheet_index, later)) {
                report.add_error(
                    *sheet_index,
                    Some(&later.id),
                    format!(
                        "Range '{}' overlaps range '{}' on sheet {}",
                        later.name, earlier.name, sheet_index
                    ),
                );
            }
        }
    }

    report
}

fn stored_bounds(sheet_index: usize, range: &Range) -> Bounds {
    Bounds {
        sheet_index,
        ..range.bounds()
    }
}

fn validate_committed_range(sheet_index: usize, range: &Range, report: &mut WorkbookReport) {
    let bounds = range.bounds();

    if bounds.is_inverted() {
        report.add_error(
            sheet_index,
            Some(&range.id),
            format!(
                "Range '{}' has start values after end values ({}-{}, {}-{})",
                range.name, range.row_start, range.row_end, range.col_start, range.col_end
            ),
        );
    } else if bounds.has_negative_start() {
        report.add_error(
            sheet_index,
            Some(&range.id),
            format!("Range '{}' has negative coordinates", range.name),
        );
    }

    if range.sheet_index != sheet_index {
        report.add_error(
            sheet_index,
            Some(&range.id),
            format!(
                "Range '{}' claims sheet {} but is stored on sheet {}",
                range.name, range.sheet_index, sheet_index
            ),
        );
    }

    if range.name.trim().is_empty() {
        report.add_warning(sheet_index, Some(&range.id), "Range has no name".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(name: &str, rows: (i64, i64), cols: (i64, i64), sheet_index: usize) -> Range {
        Range {
            id: format!("id-{name}"),
            name: name.to_string(),
            row_start: rows.0,
            row_end: rows.1,
            col_start: cols.0,
            col_end: cols.1,
            sheet_index,
            color: None,
        }
    }

    #[test]
    fn test_validation_result_accessors() {
        let ok = ValidationResult::valid();
        assert!(ok.is_valid());
        assert!(ok.conflicting_ranges().is_empty());
        assert!(ok.message().is_none());

        let bad = ValidationResult::rejected(RangeError::NegativeCoordinate);
        assert!(!bad.is_valid());
        assert!(bad.conflicting_ranges().is_empty());
        assert!(bad.message().unwrap().contains("non-negative"));
    }

    #[test]
    fn test_conflict_message_lists_every_name() {
        let existing = vec![
            range("Header", (0, 0), (0, 9), 0),
            range("Body", (1, 20), (0, 9), 0),
            range("Notes", (30, 40), (0, 9), 0),
        ];
        let proposal = RangeProposal {
            name: "Wide".to_string(),
            row_start: 0,
            row_end: 5,
            col_start: 4,
            col_end: 4,
            sheet_index: 0,
            color: None,
        };

        let result = validate_new_range(&proposal, &existing);
        assert_eq!(result.conflicting_ranges().len(), 2);
        assert_eq!(
            result.message().as_deref(),
            Some("Range overlaps with existing range(s): Header, Body")
        );
    }

    #[test]
    fn test_inverted_bounds_win_over_negative_start() {
        let proposal = RangeProposal {
            name: "Both".to_string(),
            row_start: -1,
            row_end: -3,
            col_start: 0,
            col_end: 0,
            sheet_index: 0,
            color: None,
        };

        let result = validate_new_range(&proposal, &[]);
        assert_eq!(result.error, Some(RangeError::InvalidBounds));
    }

    #[test]
    fn test_empty_workbook_report() {
        let report = WorkbookReport::new();
        assert!(report.is_valid());
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn test_warnings_do_not_invalidate_report() {
        let mut report = WorkbookReport::new();
        report.add_warning(0, Some("a"), "Range has no name".to_string());
        assert!(report.is_valid());

        report.add_error(0, Some("a"), "broken".to_string());
        assert!(!report.is_valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            sheet_index: 2,
            range_id: Some("r1".to_string()),
            message: "Range 'A' overlaps range 'B'".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            diagnostic.to_string(),
            "error: sheet 2 range r1: Range 'A' overlaps range 'B'"
        );
    }
}

//! Validation Engine
//!
//! Range admission and workbook audits, kept free of storage and CLI concerns.

pub mod engine;

pub use engine::{
    ranges_overlap, validate_new_range, validate_workbook, Diagnostic, RangeError, Severity,
    ValidationResult, WorkbookReport,
};

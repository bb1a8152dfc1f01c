//! Sheet Ranges
//!
//! Named, non-overlapping rectangular ranges on the sheets of a tabular
//! document.
//!
//! This library provides:
//! - Range admission (bounds, non-negative starts, same-sheet conflicts)
//! - A caller-owned workbook with JSON save/load
//! - Workbook audits and live re-checking of range files
//! - Configuration management

pub mod cli;
pub mod config;
pub mod form;
pub mod range;
pub mod validation;
pub mod watch;
pub mod workbook;

pub use config::Config;
pub use range::{generate_range_id, Range, RangeProposal};
pub use validation::{ranges_overlap, validate_new_range, RangeError, ValidationResult};
pub use workbook::{Sheet, Workbook};

//! Workbook
//!
//! Caller-owned collection of sheets and their committed ranges. Every
//! mutation goes through the validator so the non-overlap invariant holds
//! between calls.

pub mod store;

pub use store::{Sheet, Workbook, WorkbookError};

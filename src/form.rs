//! Range form input.
//!
//! Converts the raw strings typed into a "new range" form into a
//! [`RangeProposal`]. Geometry rules (ordering, non-negative starts,
//! conflicts) are left to the validator.

use regex::Regex;
use std::sync::LazyLock;

use crate::range::RangeProposal;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color pattern"));

/// Raw form fields, as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeForm {
    pub name: String,
    pub row_start: String,
    pub row_end: String,
    pub col_start: String,
    pub col_end: String,
    pub sheet_index: String,
    pub color: Option<String>,
}

impl RangeForm {
    pub fn parse(&self) -> Result<RangeProposal, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Range Name is required".to_string());
        }

        let sheet_index = self.sheet_index.trim();
        let sheet_index: usize = sheet_index
            .parse()
            .map_err(|_| format!("Sheet expects a sheet index, got '{}'", sheet_index))?;

        let color = match self.color.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(color) => {
                if !is_hex_color(color) {
                    return Err(format!("Color expects #RRGGBB, got '{}'", color));
                }
                Some(color.to_string())
            }
        };

        Ok(RangeProposal {
            name: name.to_string(),
            row_start: parse_coordinate("Row Start", &self.row_start)?,
            row_end: parse_coordinate("Row End", &self.row_end)?,
            col_start: parse_coordinate("Column Start", &self.col_start)?,
            col_end: parse_coordinate("Column End", &self.col_end)?,
            sheet_index,
            color,
        })
    }
}

/// Parse an optional coordinate field, treating blank input as absent
pub fn parse_optional_coordinate(field: &str, value: Option<&str>) -> Result<Option<i64>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_coordinate(field, value).map(Some),
    }
}

fn parse_coordinate(field: &str, value: &str) -> Result<i64, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", field));
    }
    value
        .parse()
        .map_err(|_| format!("{} expects a whole number, got '{}'", field, value))
}

/// `#RRGGBB`, either case
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

//! Range Types
//!
//! Plain data for committed ranges, proposals and partial updates.
//! Field names serialize in camelCase to stay compatible with saved range files.

use serde::{Deserialize, Serialize};

/// A committed rectangular selection on one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub id: String,
    pub name: String,
    pub row_start: i64,
    pub row_end: i64,
    pub col_start: i64,
    pub col_end: i64,
    pub sheet_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A range as submitted for validation, before it has an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeProposal {
    pub name: String,
    pub row_start: i64,
    pub row_end: i64,
    pub col_start: i64,
    pub col_end: i64,
    pub sheet_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Partial update for a committed range; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeUpdate {
    pub name: Option<String>,
    pub row_start: Option<i64>,
    pub row_end: Option<i64>,
    pub col_start: Option<i64>,
    pub col_end: Option<i64>,
    pub sheet_index: Option<usize>,
    pub color: Option<String>,
}

/// Geometry of a range: the sheet plus inclusive, zero-based row/column spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub sheet_index: usize,
    pub row_start: i64,
    pub row_end: i64,
    pub col_start: i64,
    pub col_end: i64,
}

impl Bounds {
    /// Inclusive intersection on both axes. Ranges on different sheets never overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        if self.sheet_index != other.sheet_index {
            return false;
        }

        let row_overlap = !(self.row_end < other.row_start || other.row_end < self.row_start);
        let col_overlap = !(self.col_end < other.col_start || other.col_end < self.col_start);

        row_overlap && col_overlap
    }

    /// Start after end on either axis
    pub fn is_inverted(&self) -> bool {
        self.row_start > self.row_end || self.col_start > self.col_end
    }

    /// A start coordinate below zero
    pub fn has_negative_start(&self) -> bool {
        self.row_start < 0 || self.col_start < 0
    }

    /// Number of cells covered, zero for inverted bounds.
    /// `None` when the count does not fit in a `u64`.
    pub fn cell_count(&self) -> Option<u64> {
        if self.is_inverted() {
            return Some(0);
        }
        let span = |start: i64, end: i64| (i128::from(end) - i128::from(start) + 1) as u128;
        let cells = span(self.row_start, self.row_end)
            .checked_mul(span(self.col_start, self.col_end))?;
        u64::try_from(cells).ok()
    }
}

impl Range {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            sheet_index: self.sheet_index,
            row_start: self.row_start,
            row_end: self.row_end,
            col_start: self.col_start,
            col_end: self.col_end,
        }
    }

    /// Commit a proposal under the given id
    pub fn from_proposal(id: String, proposal: RangeProposal) -> Self {
        Self {
            id,
            name: proposal.name,
            row_start: proposal.row_start,
            row_end: proposal.row_end,
            col_start: proposal.col_start,
            col_end: proposal.col_end,
            sheet_index: proposal.sheet_index,
            color: proposal.color,
        }
    }

    /// Apply a partial update, returning the updated copy
    pub fn with_update(&self, update: &RangeUpdate) -> Self {
        let mut updated = self.clone();
        if let Some(name) = &update.name {
            updated.name = name.clone();
        }
        if let Some(row_start) = update.row_start {
            updated.row_start = row_start;
        }
        if let Some(row_end) = update.row_end {
            updated.row_end = row_end;
        }
        if let Some(col_start) = update.col_start {
            updated.col_start = col_start;
        }
        if let Some(col_end) = update.col_end {
            updated.col_end = col_end;
        }
        if let Some(sheet_index) = update.sheet_index {
            updated.sheet_index = sheet_index;
        }
        if let Some(color) = &update.color {
            updated.color = Some(color.clone());
        }
        updated
    }
}

impl RangeProposal {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            sheet_index: self.sheet_index,
            row_start: self.row_start,
            row_end: self.row_end,
            col_start: self.col_start,
            col_end: self.col_end,
        }
    }
}

impl RangeUpdate {
    /// Whether the update touches the geometry (and so needs re-validation)
    pub fn changes_bounds(&self) -> bool {
        self.row_start.is_some()
            || self.row_end.is_some()
            || self.col_start.is_some()
            || self.col_end.is_some()
            || self.sheet_index.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.changes_bounds() && self.name.is_none() && self.color.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(row_start: i64, row_end: i64, col_start: i64, col_end: i64) -> Bounds {
        Bounds {
            sheet_index: 0,
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    #[test]
    fn test_touching_boundary_overlaps() {
        assert!(bounds(0, 2, 0, 2).overlaps(&bounds(2, 4, 1, 3)));
        assert!(bounds(0, 2, 0, 2).overlaps(&bounds(1, 1, 2, 5)));
    }

    #[test]
    fn test_cell_count() {
        assert_eq!(bounds(0, 0, 0, 0).cell_count(), Some(1));
        assert_eq!(bounds(2, 10, 3, 13).cell_count(), Some(9 * 11));
        assert_eq!(bounds(5, 3, 0, 1).cell_count(), Some(0));
    }

    #[test]
    fn test_cell_count_of_huge_bounds() {
        assert_eq!(bounds(i64::MIN, i64::MAX, 0, 0).cell_count(), None);
        assert_eq!(bounds(0, i64::MAX, 0, i64::MAX).cell_count(), None);
        assert_eq!(
            bounds(0, 8_999_999_999, 0, 0).cell_count(),
            Some(9_000_000_000)
        );
        assert_eq!(
            bounds(0, 4_294_967_295, 0, 4_294_967_295).cell_count(),
            None
        );
        assert_eq!(
            bounds(0, 4_294_967_295, 0, 4_294_967_294).cell_count(),
            Some(u64::MAX - 4_294_967_295)
        );
    }

    #[test]
    fn test_range_json_field_names() {
        let range = Range {
            id: "range_1_abc".to_string(),
            name: "Totals".to_string(),
            row_start: 1,
            row_end: 2,
            col_start: 3,
            col_end: 4,
            sheet_index: 1,
            color: None,
        };

        let json = serde_json::to_value(&range).unwrap();
        assert_eq!(json["rowStart"], 1);
        assert_eq!(json["colEnd"], 4);
        assert_eq!(json["sheetIndex"], 1);
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_with_update_keeps_untouched_fields() {
        let range = Range {
            id: "a".to_string(),
            name: "Header".to_string(),
            row_start: 0,
            row_end: 0,
            col_start: 0,
            col_end: 5,
            sheet_index: 0,
            color: Some("#3B82F6".to_string()),
        };

        let updated = range.with_update(&RangeUpdate {
            row_end: Some(2),
            ..Default::default()
        });

        assert_eq!(updated.row_end, 2);
        assert_eq!(updated.name, "Header");
        assert_eq!(updated.id, "a");
        assert_eq!(updated.color.as_deref(), Some("#3B82F6"));
    }
}

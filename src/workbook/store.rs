use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::range::{generate_range_id, Range, RangeProposal, RangeUpdate};
use crate::validation::{validate_new_range, RangeError};

/// One sheet of the document with the ranges committed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    pub index: usize,
    /// Cell values, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(default)]
    pub ranges: Vec<Range>,
}

/// A named document made of ordered sheets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
}

/// Why a workbook mutation was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkbookError {
    /// The validator rejected the range geometry
    #[error(transparent)]
    Rejected(#[from] RangeError),
    #[error("No sheet with index {0}")]
    UnknownSheet(usize),
    #[error("No range with id '{0}'")]
    UnknownRange(String),
}

impl WorkbookError {
    /// Ranges that blocked the mutation, if it was refused for a conflict
    pub fn conflicting_ranges(&self) -> &[Range] {
        match self {
            WorkbookError::Rejected(RangeError::Conflict { conflicting }) => conflicting,
            _ => &[],
        }
    }
}

impl Workbook {
    /// Create a workbook with one empty sheet per name, indexed in order
    pub fn new<I, S>(name: impl Into<String>, sheet_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sheets = sheet_names
            .into_iter()
            .enumerate()
            .map(|(index, sheet_name)| Sheet {
                name: sheet_name.into(),
                index,
                data: None,
                ranges: Vec::new(),
            })
            .collect();

        Self {
            name: name.into(),
            sheets,
        }
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.index == index)
    }

    fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.index == index)
    }

    /// Every committed range, in sheet order
    pub fn all_ranges(&self) -> Vec<Range> {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.ranges.iter().cloned())
            .collect()
    }

    pub fn range_count(&self) -> usize {
        self.sheets.iter().map(|s| s.ranges.len()).sum()
    }

    pub fn find_range(&self, id: &str) -> Option<&Range> {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.ranges.iter())
            .find(|r| r.id == id)
    }

    /// Validate and commit a proposal.
    ///
    /// Ranges without a color take the next palette entry, cycling on the
    /// number of committed ranges. The workbook is untouched on error.
    pub fn add_range(
        &mut self,
        proposal: RangeProposal,
        palette: &[String],
    ) -> Result<Range, WorkbookError> {
        let existing = self.all_ranges();
        validate_new_range(&proposal, &existing).into_result()?;

        let sheet_index = proposal.sheet_index;
        if self.sheet(sheet_index).is_none() {
            return Err(WorkbookError::UnknownSheet(sheet_index));
        }

        let mut range = Range::from_proposal(generate_range_id(), proposal);
        if range.color.is_none() && !palette.is_empty() {
            range.color = Some(palette[existing.len() % palette.len()].clone());
        }

        let sheet = self
            .sheet_mut(sheet_index)
            .ok_or(WorkbookError::UnknownSheet(sheet_index))?;
        sheet.ranges.push(range.clone());

        log::info!(
            "Added range '{}' ({}) to sheet '{}'",
            range.name,
            range.id,
            sheet.name
        );

        Ok(range)
    }

    /// Remove a range by id from the given sheet. Absent ranges are ignored.
    pub fn remove_range(&mut self, id: &str, sheet_index: usize) -> Option<Range> {
        let sheet = self.sheet_mut(sheet_index)?;
        let position = sheet.ranges.iter().position(|r| r.id == id)?;
        let removed = sheet.ranges.remove(position);

        log::info!("Removed range '{}' ({})", removed.name, removed.id);
        Some(removed)
    }

    /// Apply a partial update to a committed range.
    ///
    /// Geometry changes are re-validated against every other committed range.
    /// Moving to another sheet appends the range to that sheet.
    pub fn update_range(&mut self, id: &str, update: RangeUpdate) -> Result<Range, WorkbookError> {
        let (owner, position) = self
            .locate_range(id)
            .ok_or_else(|| WorkbookError::UnknownRange(id.to_string()))?;
        let updated = self.sheets[owner].ranges[position].with_update(&update);

        if update.changes_bounds() {
            let others: Vec<Range> = self
                .all_ranges()
                .into_iter()
                .filter(|r| r.id != id)
                .collect();
            let proposal = RangeProposal {
                name: updated.name.clone(),
                row_start: updated.row_start,
                row_end: updated.row_end,
                col_start: updated.col_start,
                col_end: updated.col_end,
                sheet_index: updated.sheet_index,
                color: updated.color.clone(),
            };
            validate_new_range(&proposal, &others).into_result()?;
        }

        // A hand-edited file may store a range on a sheet other than the one
        // it claims; the range then moves to the sheet it claims.
        let target = self
            .sheets
            .iter()
            .position(|s| s.index == updated.sheet_index)
            .ok_or(WorkbookError::UnknownSheet(updated.sheet_index))?;

        if target == owner {
            self.sheets[owner].ranges[position] = updated.clone();
        } else {
            self.sheets[owner].ranges.remove(position);
            self.sheets[target].ranges.push(updated.clone());
        }

        log::info!("Updated range '{}' ({})", updated.name, updated.id);
        Ok(updated)
    }

    /// Position of a range as (index into `sheets`, index into that sheet's ranges)
    fn locate_range(&self, id: &str) -> Option<(usize, usize)> {
        self.sheets.iter().enumerate().find_map(|(owner, sheet)| {
            sheet
                .ranges
                .iter()
                .position(|r| r.id == id)
                .map(|position| (owner, position))
        })
    }

    /// Serialize as pretty JSON (two-space indent)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize workbook")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid JSON format")
    }

    /// Load a workbook from a JSON range file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read range file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse range file: {}", path.display()))
    }

    /// Save the workbook as a JSON range file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write range file: {}", path.display()))?;
        log::debug!("Saved workbook '{}' to {}", self.name, path.display());
        Ok(())
    }
}

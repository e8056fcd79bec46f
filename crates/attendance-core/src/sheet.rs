//! Monthly sheet identity.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::grid::Grid;

/// Name of the sheet cloned when a month is first synced.
pub const TEMPLATE_SHEET: &str = "template";

/// `YYYYMM` label for a month.
pub fn sheet_label(year: i32, month: u32) -> String {
    format!("{year}{month:02}")
}

/// Label of the sheet that holds `date`.
pub fn sheet_label_for(date: NaiveDate) -> String {
    sheet_label(date.year(), date.month())
}

/// Split a `YYYYMM` label into year and month.
pub fn parse_sheet_label(label: &str) -> Result<(i32, u32)> {
    let invalid = || ValidationError::InvalidSheetLabel(label.to_string());
    if label.len() != 6 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid().into());
    }
    let year: i32 = label[..4].parse().map_err(|_| invalid())?;
    let month: u32 = label[4..].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid().into());
    }
    Ok((year, month))
}

/// A named grid: one month, or the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

impl Sheet {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    pub fn is_template(&self) -> bool {
        self.name == TEMPLATE_SHEET
    }
}

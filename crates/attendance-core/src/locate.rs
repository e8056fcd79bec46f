//! Find the session columns held on a given day.

use chrono::NaiveDate;

use crate::grid::Grid;
use crate::normalize::{date_label, Labels};

/// Indices of every header cell equal to `label`.
pub fn locate_label<S: AsRef<str>>(header_row: &[S], label: &str) -> Vec<usize> {
    header_row
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.as_ref() == label)
        .map(|(i, _)| i)
        .collect()
}

/// Grid column indices of the sessions on `date`. A missing grid has none.
pub fn locate(grid: Option<&Grid>, date: NaiveDate, labels: &Labels) -> Vec<usize> {
    match grid {
        Some(grid) => locate_label(&grid.header_row(), &date_label(date, labels)),
        None => Vec::new(),
    }
}

//! Column-major cell grid backing a monthly attendance sheet.
//!
//! Layout (0-based):
//! - row 0 date, row 1 time, row 2 event name, row 3 place
//! - rows 4.. one per member
//! - column 0 member name, column 1 member metadata
//! - columns 2.. one per session, keyed by (date, time)
//!
//! Columns are stored as an ordered sequence of [`Column`] records so that
//! inserting or deleting a session is a single `Vec` operation. Positions
//! handed to the `*_data_column` methods are data positions (0 = first
//! session column); [`Grid::data_index`] is the only place that converts
//! them into grid column indices.

use serde::{Deserialize, Serialize};

pub const DATE_ROW: usize = 0;
pub const TIME_ROW: usize = 1;
pub const NAME_ROW: usize = 2;
pub const PLACE_ROW: usize = 3;
/// Number of header rows above the first member row.
pub const HEADER_ROWS: usize = 4;

/// Column holding the member name.
pub const MEMBER_NAME_COLUMN: usize = 0;
/// First column written by a member-row update.
pub const MEMBER_VALUES_COLUMN: usize = 1;
/// First session column.
pub const DATA_COLUMN_START: usize = 2;

/// One column of cells, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    cells: Vec<String>,
}

impl Column {
    fn blank(height: usize) -> Self {
        Self {
            cells: vec![String::new(); height],
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn cell(&self, row: usize) -> &str {
        self.cells.get(row).map(String::as_str).unwrap_or("")
    }
}

/// The four header cells of a session column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub date: String,
    pub time: String,
    pub name: String,
    pub place: String,
}

impl SessionHeader {
    /// One entry of a schedule listing, e.g. `1/2(火) 19:00-21:00<br/> 正規練 @公園<br/>`.
    pub fn schedule_line(&self) -> String {
        format!(
            "{} {}<br/> {} @{}<br/>",
            self.date, self.time, self.name, self.place
        )
    }
}

/// Rectangular grid of string cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    height: usize,
    columns: Vec<Column>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            height: HEADER_ROWS,
            columns: (0..DATA_COLUMN_START)
                .map(|_| Column::blank(HEADER_ROWS))
                .collect(),
        }
    }
}

impl Grid {
    /// Empty grid: header rows and the two identity columns, no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from row-major data. Ragged rows are padded with empty cells.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<C>>,
        C: Into<String>,
    {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let height = rows.len().max(HEADER_ROWS);
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(DATA_COLUMN_START);

        let mut columns: Vec<Column> = (0..width).map(|_| Column::blank(height)).collect();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                columns[c].cells[r] = value;
            }
        }
        Self { height, columns }
    }

    /// Row-major copy of every cell.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        (0..self.height)
            .map(|r| self.columns.iter().map(|c| c.cells[r].clone()).collect())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Cell value, or `""` outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.columns
            .get(column)
            .map(|c| c.cell(row))
            .unwrap_or("")
    }

    /// Set a cell, growing the grid when the target lies outside it.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if row >= self.height {
            self.height = row + 1;
            for c in &mut self.columns {
                c.cells.resize(self.height, String::new());
            }
        }
        while self.columns.len() <= column {
            self.columns.push(Column::blank(self.height));
        }
        self.columns[column].cells[row] = value.into();
    }

    /// All cells of one row, left to right.
    pub fn row(&self, row: usize) -> Vec<&str> {
        self.columns.iter().map(|c| c.cell(row)).collect()
    }

    /// The date header row, used to locate a day's sessions.
    pub fn header_row(&self) -> Vec<&str> {
        self.row(DATE_ROW)
    }

    pub fn column(&self, column: usize) -> Option<&Column> {
        self.columns.get(column)
    }

    /// Grid column index of a data position.
    pub fn data_index(position: usize) -> usize {
        DATA_COLUMN_START + position
    }

    /// Number of session columns.
    pub fn data_len(&self) -> usize {
        self.columns.len().saturating_sub(DATA_COLUMN_START)
    }

    /// (date, time) key of the session at `position`.
    pub fn data_key(&self, position: usize) -> Option<(&str, &str)> {
        let column = self.columns.get(Self::data_index(position))?;
        Some((column.cell(DATE_ROW), column.cell(TIME_ROW)))
    }

    /// Header of the column at grid index `column`.
    pub fn header(&self, column: usize) -> Option<SessionHeader> {
        let column = self.columns.get(column)?;
        Some(SessionHeader {
            date: column.cell(DATE_ROW).to_string(),
            time: column.cell(TIME_ROW).to_string(),
            name: column.cell(NAME_ROW).to_string(),
            place: column.cell(PLACE_ROW).to_string(),
        })
    }

    /// Insert a blank session column at `position`, shifting later ones right.
    /// Positions past the end append.
    pub fn insert_data_column(&mut self, position: usize) {
        let index = Self::data_index(position).min(self.columns.len());
        self.columns.insert(index, Column::blank(self.height));
    }

    /// Remove the session column at `position`, shifting later ones left.
    pub fn remove_data_column(&mut self, position: usize) -> Option<Column> {
        let index = Self::data_index(position);
        (index < self.columns.len()).then(|| self.columns.remove(index))
    }

    /// Move the session column at `from` so that it ends up at `to`.
    pub fn move_data_column(&mut self, from: usize, to: usize) {
        if let Some(column) = self.remove_data_column(from) {
            let index = Self::data_index(to).min(self.columns.len());
            self.columns.insert(index, column);
        }
    }

    /// Rewrite the four header cells of the session at `position`.
    pub fn set_header(&mut self, position: usize, header: &SessionHeader) {
        let column = Self::data_index(position);
        self.set_cell(DATE_ROW, column, header.date.as_str());
        self.set_cell(TIME_ROW, column, header.time.as_str());
        self.set_cell(NAME_ROW, column, header.name.as_str());
        self.set_cell(PLACE_ROW, column, header.place.as_str());
    }

    /// Row indices of member rows.
    pub fn member_rows(&self) -> std::ops::Range<usize> {
        HEADER_ROWS..self.height
    }

    pub fn member_name(&self, row: usize) -> &str {
        self.cell(row, MEMBER_NAME_COLUMN)
    }

    /// First member row whose name cell equals `name`.
    pub fn find_member_row(&self, name: &str) -> Option<usize> {
        self.member_rows().find(|&r| self.member_name(r) == name)
    }

    /// Overwrite consecutive cells of `row` starting at `start_column`.
    pub fn write_row<S: AsRef<str>>(&mut self, row: usize, start_column: usize, values: &[S]) {
        for (offset, value) in values.iter().enumerate() {
            self.set_cell(row, start_column + offset, value.as_ref());
        }
    }
}

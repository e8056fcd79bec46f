//! Sheet persistence seam.

use tracing::debug;

use crate::error::{NotFoundError, Result};
use crate::sheet::{Sheet, TEMPLATE_SHEET};

/// Named-sheet storage. Column edits happen on the in-memory
/// [`Grid`](crate::grid::Grid); a store only loads and saves whole sheets.
pub trait SheetStore {
    /// Sheet by name, `None` if it does not exist.
    fn sheet(&self, name: &str) -> Result<Option<Sheet>>;

    /// Create or replace a sheet.
    fn save_sheet(&mut self, sheet: &Sheet) -> Result<()>;

    /// All sheet names in creation order, template included.
    fn sheet_names(&self) -> Result<Vec<String>>;

    /// Sheet by name, or `NotFound`.
    fn require_sheet(&self, name: &str) -> Result<Sheet> {
        self.sheet(name)?
            .ok_or_else(|| NotFoundError::Sheet(name.to_string()).into())
    }

    /// Copy of the template sheet under `name`. Nothing is saved; the caller
    /// persists the sheet once it is filled in.
    fn clone_template(&self, name: &str) -> Result<Sheet> {
        let template = self.sheet(TEMPLATE_SHEET)?.ok_or(NotFoundError::Template)?;
        debug!(sheet = name, "new sheet from template");
        Ok(Sheet::new(name, template.grid))
    }

    /// Existing sheet, or an unsaved copy of the template.
    fn sheet_or_clone(&self, name: &str) -> Result<Sheet> {
        match self.sheet(name)? {
            Some(sheet) => Ok(sheet),
            None => self.clone_template(name),
        }
    }

    /// Month sheet names, template excluded.
    fn month_sheet_names(&self) -> Result<Vec<String>> {
        Ok(self
            .sheet_names()?
            .into_iter()
            .filter(|n| n != TEMPLATE_SHEET)
            .collect())
    }
}

/// Sheets held in memory. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetStore {
    sheets: Vec<Sheet>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheets(sheets: impl IntoIterator<Item = Sheet>) -> Self {
        Self {
            sheets: sheets.into_iter().collect(),
        }
    }
}

impl SheetStore for MemorySheetStore {
    fn sheet(&self, name: &str) -> Result<Option<Sheet>> {
        Ok(self.sheets.iter().find(|s| s.name == name).cloned())
    }

    fn save_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet.clone(),
            None => self.sheets.push(sheet.clone()),
        }
        Ok(())
    }

    fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.sheets.iter().map(|s| s.name.clone()).collect())
    }
}

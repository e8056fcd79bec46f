//! Calendar events read from a JSON file.
//!
//! The file holds an array of [`CalendarEvent`] objects; only events starting
//! in the requested month are returned. Used for offline syncs and tests.

use std::path::{Path, PathBuf};

use chrono::Datelike;

use super::traits::CalendarSource;
use crate::error::Result;
use crate::normalize::CalendarEvent;

pub struct FileCalendarSource {
    path: PathBuf,
}

impl FileCalendarSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CalendarSource for FileCalendarSource {
    fn name(&self) -> &str {
        "file"
    }

    fn events(&self, year: i32, month: u32) -> Result<Vec<CalendarEvent>> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut events: Vec<CalendarEvent> = serde_json::from_str(&content)?;
        events.retain(|e| e.start.year() == year && e.start.month() == month);
        events.sort_by_key(|e| e.start);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_to_month_in_start_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(
            &path,
            r#"[
                {"start": "2024-01-09T19:00:00", "end": "2024-01-09T21:00:00", "title": "稽古"},
                {"start": "2024-02-01T19:00:00", "end": "2024-02-01T21:00:00", "title": "二月"},
                {"start": "2024-01-02T19:00:00", "end": "2024-01-02T21:00:00", "title": "初稽古@公園", "location": "道場"}
            ]"#,
        )
        .unwrap();

        let events = FileCalendarSource::new(&path).events(2024, 1).unwrap();
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["初稽古@公園", "稽古"]);
        assert_eq!(events[0].location.as_deref(), Some("道場"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let source = FileCalendarSource::new("/nonexistent/events.json");
        assert!(source.events(2024, 1).is_err());
    }
}

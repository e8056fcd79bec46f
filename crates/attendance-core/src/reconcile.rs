//! Align a sheet's session columns with the calendar.
//!
//! Columns are keyed by their (date, time) header pair. A sync run:
//!
//! 1. deletes every column whose key no longer appears in the event list,
//! 2. walks the event list and makes the column at each position carry that
//!    event's key, reusing an existing column when one has the key and
//!    inserting a blank one otherwise,
//! 3. rewrites the four header rows from the event list.
//!
//! Mark cells travel with their column, so a session whose place changed but
//! whose date and time did not keeps every mark entered for it.
//!
//! Two events sharing a (date, time) pair cannot be told apart by this key,
//! so which stored column carries which event's marks is unspecified. A sheet
//! holding more columns for a key than the calendar has events keeps the
//! extra columns after the synced ones; they are only reported with `warn!`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::Grid;
use crate::normalize::NormalizedEvent;

/// What a reconciliation run did to the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    /// Columns removed because their session disappeared.
    pub deleted: usize,
    /// Blank columns added for new sessions.
    pub inserted: usize,
    /// Existing columns that had to be moved to match the event order.
    pub moved: usize,
    /// Existing columns already in place.
    pub kept: usize,
}

impl ReconcileSummary {
    /// Whether any column was added, removed or moved.
    pub fn has_changes(&self) -> bool {
        self.deleted + self.inserted + self.moved > 0
    }

    /// Get a human-readable summary message.
    pub fn message(&self) -> String {
        format!(
            "{} inserted, {} deleted, {} moved, {} unchanged",
            self.inserted, self.deleted, self.moved, self.kept
        )
    }
}

/// Reconcile `grid` against `events` in place.
pub fn reconcile(grid: &mut Grid, events: &[NormalizedEvent]) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    // Deleting shifts the next column into the current position, so the
    // position only advances past columns that are kept.
    let mut position = 0;
    loop {
        let keep = match grid.data_key(position) {
            None => break,
            Some(key) => events.iter().any(|e| e.key() == key),
        };
        if keep {
            position += 1;
        } else {
            if let Some(column) = grid.remove_data_column(position) {
                debug!(
                    date = column.cell(crate::grid::DATE_ROW),
                    time = column.cell(crate::grid::TIME_ROW),
                    "deleted session column"
                );
            }
            summary.deleted += 1;
        }
    }

    for (position, event) in events.iter().enumerate() {
        if grid.data_key(position) == Some(event.key()) {
            summary.kept += 1;
            continue;
        }
        let later = (position + 1..grid.data_len()).find(|&p| grid.data_key(p) == Some(event.key()));
        match later {
            Some(from) => {
                grid.move_data_column(from, position);
                summary.moved += 1;
                debug!(date = %event.date, time = %event.time, from, to = position, "moved session column");
            }
            None => {
                grid.insert_data_column(position);
                summary.inserted += 1;
                debug!(date = %event.date, time = %event.time, position, "inserted session column");
            }
        }
    }

    for (position, event) in events.iter().enumerate() {
        grid.set_header(position, &event.header());
    }

    if grid.data_len() > events.len() {
        warn!(
            extra = grid.data_len() - events.len(),
            "sheet keeps columns sharing a date and time with another session"
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DATE_ROW, PLACE_ROW, TIME_ROW};

    fn ev(date: &str, time: &str, place: &str) -> NormalizedEvent {
        NormalizedEvent {
            date: date.into(),
            time: time.into(),
            name: "正規練".into(),
            place: place.into(),
        }
    }

    /// Grid with one member row whose marks are the column names.
    fn grid_with(columns: &[(&str, &str, &str)]) -> Grid {
        let mut grid = Grid::new();
        grid.set_cell(4, 0, "田中");
        for (i, (date, time, mark)) in columns.iter().enumerate() {
            let c = Grid::data_index(i);
            grid.set_cell(DATE_ROW, c, *date);
            grid.set_cell(TIME_ROW, c, *time);
            grid.set_cell(4, c, *mark);
        }
        grid
    }

    fn keys(grid: &Grid) -> Vec<(String, String)> {
        (0..grid.data_len())
            .filter_map(|p| grid.data_key(p))
            .map(|(d, t)| (d.to_string(), t.to_string()))
            .collect()
    }

    fn marks(grid: &Grid) -> Vec<&str> {
        (0..grid.data_len())
            .map(|p| grid.cell(4, Grid::data_index(p)))
            .collect()
    }

    #[test]
    fn deletes_then_inserts() {
        let mut grid = grid_with(&[
            ("1/1(月)", "19:00-21:00", "A"),
            ("1/2(火)", "19:00-21:00", "B"),
            ("1/3(水)", "19:00-21:00", "C"),
        ]);
        let events = vec![
            ev("1/1(月)", "19:00-21:00", "公園"),
            ev("1/3(水)", "19:00-21:00", "公園"),
            ev("1/4(木)", "19:00-21:00", "公園"),
        ];

        let summary = reconcile(&mut grid, &events);

        assert_eq!(marks(&grid), vec!["A", "C", ""]);
        assert_eq!(keys(&grid)[2], ("1/4(木)".to_string(), "19:00-21:00".to_string()));
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.kept, 2);
    }

    #[test]
    fn consecutive_deletions_do_not_skip_columns() {
        let mut grid = grid_with(&[
            ("1/1(月)", "19:00-21:00", "A"),
            ("1/2(火)", "19:00-21:00", "B"),
            ("1/3(水)", "19:00-21:00", "C"),
            ("1/4(木)", "19:00-21:00", "D"),
        ]);
        let events = vec![ev("1/4(木)", "19:00-21:00", "公園")];

        reconcile(&mut grid, &events);

        assert_eq!(marks(&grid), vec!["D"]);
    }

    #[test]
    fn place_change_keeps_marks() {
        let mut grid = grid_with(&[("1/1(月)", "19:00-21:00", "鍵")]);
        grid.set_cell(PLACE_ROW, Grid::data_index(0), "公園");

        let summary = reconcile(&mut grid, &[ev("1/1(月)", "19:00-21:00", "体育館")]);

        assert!(!summary.has_changes());
        assert_eq!(grid.cell(PLACE_ROW, Grid::data_index(0)), "体育館");
        assert_eq!(marks(&grid), vec!["鍵"]);
    }

    #[test]
    fn time_change_replaces_column() {
        let mut grid = grid_with(&[("1/1(月)", "19:00-21:00", "鍵")]);

        reconcile(&mut grid, &[ev("1/1(月)", "18:00-20:00", "公園")]);

        assert_eq!(marks(&grid), vec![""]);
        assert_eq!(grid.cell(TIME_ROW, Grid::data_index(0)), "18:00-20:00");
    }

    #[test]
    fn empty_event_list_clears_all_sessions() {
        let mut grid = grid_with(&[
            ("1/1(月)", "19:00-21:00", "A"),
            ("1/2(火)", "19:00-21:00", "B"),
        ]);

        let summary = reconcile(&mut grid, &[]);

        assert_eq!(grid.data_len(), 0);
        assert_eq!(summary.deleted, 2);
        assert_eq!(grid.member_name(4), "田中");
    }

    #[test]
    fn reordered_events_move_columns_with_marks() {
        let mut grid = grid_with(&[
            ("1/3(水)", "19:00-21:00", "C"),
            ("1/1(月)", "19:00-21:00", "A"),
        ]);
        let events = vec![
            ev("1/1(月)", "19:00-21:00", "公園"),
            ev("1/3(水)", "19:00-21:00", "公園"),
        ];

        let summary = reconcile(&mut grid, &events);

        assert_eq!(marks(&grid), vec!["A", "C"]);
        assert_eq!(summary.moved, 1);
        assert_eq!(grid.data_len(), 2);
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut grid = grid_with(&[("1/2(火)", "19:00-21:00", "B")]);
        let events = vec![
            ev("1/1(月)", "19:00-21:00", "公園"),
            ev("1/2(火)", "19:00-21:00", "公園"),
        ];

        reconcile(&mut grid, &events);
        let once = grid.clone();
        let summary = reconcile(&mut grid, &events);

        assert_eq!(grid, once);
        assert!(!summary.has_changes());
        assert_eq!(summary.kept, 2);
    }

    #[test]
    fn extra_duplicate_columns_are_kept() {
        let mut grid = grid_with(&[
            ("1/2(火)", "19:00-21:00", "A"),
            ("1/2(火)", "19:00-21:00", "B"),
        ]);
        let events = vec![ev("1/2(火)", "19:00-21:00", "公園")];

        let summary = reconcile(&mut grid, &events);

        assert_eq!(grid.data_len(), 2);
        assert_eq!(marks(&grid), vec!["A", "B"]);
        assert_eq!(summary.kept, 1);
        assert_eq!(summary.deleted, 0);
        assert_eq!(grid.cell(PLACE_ROW, Grid::data_index(0)), "公園");
    }
}

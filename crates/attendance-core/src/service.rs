//! Attendance operations.
//!
//! [`AttendanceService`] ties the pure pieces together: it fetches a month of
//! calendar events, reconciles the month sheet against them, answers "who
//! attends on this day", and hands notification mail to the configured
//! transport. Storage, calendar and mail are trait seams so the same code runs
//! against SQLite and Google in the CLI, and in memory in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, SessionAttendance};
use crate::error::{NotFoundError, Result, ValidationError};
use crate::grid::{Grid, MEMBER_VALUES_COLUMN};
use crate::integrations::{CalendarSource, MailSender};
use crate::locate::locate;
use crate::normalize::normalize_all;
use crate::notify;
use crate::reconcile::{reconcile, ReconcileSummary};
use crate::sheet::{parse_sheet_label, sheet_label, sheet_label_for, Sheet, TEMPLATE_SHEET};
use crate::storage::{Config, SheetStore};

/// Shown when the month has no calendar events.
pub const NO_EVENTS_MESSAGE: &str = "該当月のカレンダーにはイベントが存在しませんでした";

/// Result of an operation that can legitimately do nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// The operation ran; carries its user-facing text.
    Done(String),
    /// Nothing to work on.
    Empty(String),
    /// Not attempted because a setting is missing or nothing applies.
    Skipped(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Outcome::Done(m) | Outcome::Empty(m) | Outcome::Skipped(m) => m,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

/// Result of syncing one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub sheet: String,
    /// `None` when the calendar was empty and the sheet was left alone.
    pub summary: Option<ReconcileSummary>,
    pub outcome: Outcome,
}

/// Schedule text for a sheet's sessions, one `<br/>`-joined line per column.
pub fn schedule_text(grid: &Grid) -> String {
    (0..grid.data_len())
        .filter_map(|position| grid.header(Grid::data_index(position)))
        .map(|h| h.schedule_line())
        .collect::<Vec<_>>()
        .join("<br/>")
}

pub struct AttendanceService<S, C, M> {
    config: Config,
    store: S,
    calendar: C,
    mailer: M,
}

impl<S, C, M> AttendanceService<S, C, M>
where
    S: SheetStore,
    C: CalendarSource,
    M: MailSender,
{
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(config: Config, store: S, calendar: C, mailer: M) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            calendar,
            mailer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Bring the month sheet in line with the calendar.
    ///
    /// An empty calendar month leaves storage untouched. Otherwise the sheet
    /// is created from the template if needed, reconciled in memory and saved
    /// once; the outcome carries the month's schedule text.
    ///
    /// # Errors
    ///
    /// Returns an error if the calendar cannot be read, the template is
    /// missing, or the sheet cannot be saved.
    pub fn sync_month(&mut self, year: i32, month: u32) -> Result<SyncReport> {
        let name = sheet_label(year, month);
        parse_sheet_label(&name)?;

        let events = self.calendar.events(year, month)?;
        debug!(source = self.calendar.name(), count = events.len(), sheet = %name, "fetched events");
        if events.is_empty() {
            info!(sheet = %name, "no calendar events for month");
            return Ok(SyncReport {
                sheet: name,
                summary: None,
                outcome: Outcome::Empty(NO_EVENTS_MESSAGE.to_string()),
            });
        }

        let normalized = normalize_all(&events, &self.config.labels);
        let mut sheet = self.store.sheet_or_clone(&name)?;
        let summary = reconcile(&mut sheet.grid, &normalized);
        self.store.save_sheet(&sheet)?;
        info!(sheet = %name, summary = %summary.message(), "sheet synced");

        let schedule = normalized
            .iter()
            .map(|e| e.schedule_line())
            .collect::<Vec<_>>()
            .join("<br/>");
        Ok(SyncReport {
            sheet: name,
            summary: Some(summary),
            outcome: Outcome::Done(schedule),
        })
    }

    /// A sheet by name. `None` means the month containing `today`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the sheet does not exist.
    pub fn list_sheet(&self, name: Option<&str>, today: NaiveDate) -> Result<Sheet> {
        let name = name.map_or_else(|| sheet_label_for(today), str::to_string);
        self.store.sheet(&name)?.ok_or_else(|| {
            if name == TEMPLATE_SHEET {
                NotFoundError::Template.into()
            } else {
                NotFoundError::Sheet(name.clone()).into()
            }
        })
    }

    /// Month sheet names, template excluded.
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        self.store.month_sheet_names()
    }

    /// Overwrite a member's row starting at the first value column.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the sheet or member does not exist.
    pub fn update_member_row<V: AsRef<str>>(
        &mut self,
        sheet_name: &str,
        member: &str,
        values: &[V],
    ) -> Result<()> {
        let mut sheet = self
            .store
            .sheet(sheet_name)?
            .ok_or_else(|| NotFoundError::Sheet(sheet_name.to_string()))?;
        let row = sheet
            .grid
            .find_member_row(member)
            .ok_or_else(|| NotFoundError::Member(member.to_string()))?;
        sheet.grid.write_row(row, MEMBER_VALUES_COLUMN, values);
        self.store.save_sheet(&sheet)?;
        info!(sheet = sheet_name, member, cells = values.len(), "member row updated");
        Ok(())
    }

    /// Create or replace a sheet from raw rows. The name must be the template
    /// or a `YYYYMM` month label.
    pub fn import_sheet(&mut self, name: &str, rows: Vec<Vec<String>>) -> Result<Sheet> {
        if name != TEMPLATE_SHEET {
            parse_sheet_label(name)?;
        }
        if rows.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "rows".into(),
                message: "sheet has no rows".into(),
            }
            .into());
        }
        let sheet = Sheet::new(name, Grid::from_rows(rows));
        self.store.save_sheet(&sheet)?;
        info!(sheet = name, rows = sheet.grid.height(), columns = sheet.grid.width(), "sheet imported");
        Ok(sheet)
    }

    /// Attendance for every session held on `date`, in column order. A month
    /// without a sheet has no sessions.
    pub fn attendance_on(&self, date: NaiveDate) -> Result<Vec<SessionAttendance>> {
        let sheet = self.store.sheet(&sheet_label_for(date))?;
        let grid = sheet.as_ref().map(|s| &s.grid);
        let columns = locate(grid, date, &self.config.labels);
        Ok(grid
            .map(|g| columns.iter().filter_map(|&c| aggregate(g, c)).collect())
            .unwrap_or_default())
    }

    /// Send the attendee list for the sessions on `date` (normally
    /// tomorrow).
    pub fn send_daily_notice(&self, date: NaiveDate) -> Result<Outcome> {
        let sessions = self.attendance_on(date)?;
        if sessions.is_empty() {
            debug!(%date, "no sessions; daily notice skipped");
            return Ok(Outcome::Skipped(format!("no sessions on {date}")));
        }

        let mail = match notify::daily_notice(
            date,
            &sessions,
            &self.config.notification,
            &self.config.labels,
        ) {
            Ok(mail) => mail,
            Err(e) => {
                let message = notify::missing_setting_message(&e);
                warn!(error = %e, "daily notice not sent");
                return Ok(Outcome::Skipped(message));
            }
        };

        self.mailer.send(&mail)?;
        info!(transport = self.mailer.name(), %date, sessions = sessions.len(), "daily notice sent");
        Ok(Outcome::Done(mail.subject))
    }

    /// Send the month's schedule with the registration link. The schedule is
    /// read from the month sheet, so sync first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the month sheet does not exist.
    pub fn send_monthly_announcement(
        &self,
        year: i32,
        month: u32,
        supplement: Option<&str>,
    ) -> Result<Outcome> {
        let name = sheet_label(year, month);
        let sheet = self
            .store
            .sheet(&name)?
            .ok_or_else(|| NotFoundError::Sheet(name.clone()))?;
        let schedule = schedule_text(&sheet.grid);
        if schedule.is_empty() {
            return Ok(Outcome::Empty(NO_EVENTS_MESSAGE.to_string()));
        }

        let mail = match notify::monthly_announcement(
            year,
            month,
            &schedule,
            supplement,
            &self.config.notification,
            &self.config.labels,
        ) {
            Ok(mail) => mail,
            Err(e) => {
                let message = notify::missing_setting_message(&e);
                warn!(error = %e, "monthly announcement not sent");
                return Ok(Outcome::Skipped(message));
            }
        };

        self.mailer.send(&mail)?;
        info!(transport = self.mailer.name(), sheet = %name, "monthly announcement sent");
        Ok(Outcome::Done(mail.subject))
    }
}

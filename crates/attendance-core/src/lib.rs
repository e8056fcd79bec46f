//! # Attendance Core Library
//!
//! Core logic for a practice-session attendance sheet kept in step with a
//! shared calendar. All operations are available through the
//! `attendance-cli` binary, which is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Grid**: a month sheet. Rows 0-3 hold each session's date, time, name
//!   and place; every later row is a member whose cells record a mark per
//!   session
//! - **Normalize**: calendar events to sheet header values
//! - **Reconcile**: in-place column insert/delete/move so the sheet's sessions
//!   match the calendar while members' marks stay with their session
//! - **Locate / Aggregate**: find a day's session columns and group members by
//!   mark
//! - **Storage**: SQLite-backed sheets and outbox, TOML configuration
//! - **Integrations**: calendar sources (Google, JSON file) and mail
//!   transports (outbox, webhook)
//!
//! ## Key Components
//!
//! - [`AttendanceService`]: the operations, over pluggable storage, calendar
//!   and mail
//! - [`Grid`]: column-major cell storage
//! - [`reconcile()`]: the column reconciliation algorithm
//! - [`Database`]: sheet and outbox persistence
//! - [`Config`]: application configuration management

pub mod aggregate;
pub mod error;
pub mod grid;
pub mod integrations;
pub mod locate;
pub mod normalize;
pub mod notify;
pub mod reconcile;
pub mod service;
pub mod sheet;
pub mod storage;

pub use aggregate::{aggregate, Mark, SessionAttendance, StatusGroups, NEEDS_CONFIRMATION};
pub use error::{ConfigError, CoreError, DatabaseError, NotFoundError, Result, ValidationError};
pub use grid::{Grid, SessionHeader};
pub use integrations::{CalendarSource, MailSender, OutgoingMail};
pub use locate::locate;
pub use normalize::{normalize, normalize_all, CalendarEvent, Labels, NormalizedEvent};
pub use reconcile::{reconcile, ReconcileSummary};
pub use service::{AttendanceService, Outcome, SyncReport};
pub use sheet::{sheet_label, Sheet, TEMPLATE_SHEET};
pub use storage::{Config, Database, MemorySheetStore, SheetStore};

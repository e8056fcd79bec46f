pub mod auth;
pub mod config;
pub mod member;
pub mod notify;
pub mod outbox;
pub mod sheet;
pub mod sync;

use std::path::Path;

use attendance_core::integrations::{
    CalendarSource, FileCalendarSource, GoogleCalendarSource, MailSender, OutboxMailer,
    WebhookMailer,
};
use attendance_core::sheet::{parse_sheet_label, sheet_label_for};
use attendance_core::storage::MailTransport;
use attendance_core::{AttendanceService, Config, Database};
use chrono::{Datelike, Local};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Service = AttendanceService<Database, Box<dyn CalendarSource>, Box<dyn MailSender>>;

/// Build the service from the config file and local database. `events`
/// replaces the Google calendar with a JSON file.
pub fn open_service(events: Option<&Path>) -> Result<Service, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = Database::open()?;

    let calendar: Box<dyn CalendarSource> = match events {
        Some(path) => Box::new(FileCalendarSource::new(path)),
        None => Box::new(GoogleCalendarSource::new(&config.calendar)),
    };
    let mailer: Box<dyn MailSender> = match config.mail.transport {
        MailTransport::Outbox => Box::new(OutboxMailer::new(Database::open()?)),
        MailTransport::Webhook => Box::new(WebhookMailer::new(
            config.mail.webhook_url.clone().unwrap_or_default(),
        )),
    };

    Ok(AttendanceService::new(config, store, calendar, mailer)?)
}

/// `YYYYMM` argument, defaulting to the current month.
pub fn month_arg(label: Option<&str>) -> Result<(i32, u32), Box<dyn std::error::Error>> {
    let label = match label {
        Some(label) => label.to_string(),
        None => sheet_label_for(Local::now().date_naive()),
    };
    Ok(parse_sheet_label(&label)?)
}

/// `YYYYMM` of the month after the current one.
pub fn next_month_label() -> String {
    let today = Local::now().date_naive();
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    attendance_core::sheet_label(year, month)
}

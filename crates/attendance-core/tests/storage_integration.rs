//! Integration tests for on-disk storage: SQLite sheets, the outbox, and the
//! TOML config file.

use attendance_core::integrations::{CalendarSource, OutboxMailer};
use attendance_core::storage::MailTransport;
use attendance_core::{
    AttendanceService, CalendarEvent, Config, Database, Grid, Outcome, Result, Sheet, SheetStore,
    TEMPLATE_SHEET,
};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

struct OneSession;

impl CalendarSource for OneSession {
    fn name(&self) -> &str {
        "one"
    }

    fn events(&self, _year: i32, _month: u32) -> Result<Vec<CalendarEvent>> {
        let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        Ok(vec![CalendarEvent {
            start: at("2024-04-02 19:00"),
            end: at("2024-04-02 21:00"),
            title: "正規練".into(),
            location: Some("公園".into()),
        }])
    }
}

fn template() -> Sheet {
    Sheet::new(
        TEMPLATE_SHEET,
        Grid::from_rows(vec![
            vec!["", ""],
            vec!["", ""],
            vec!["", ""],
            vec!["", ""],
            vec!["田中", ""],
            vec!["佐藤", ""],
        ]),
    )
}

#[test]
fn test_sheets_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("attendance.db");

    {
        let mut db = Database::open_at(&path).unwrap();
        db.save_sheet(&template()).unwrap();
        let mut month = template();
        month.name = "202404".into();
        month.grid.set_cell(0, 2, "4/2(火)");
        month.grid.set_cell(4, 2, "鍵");
        db.save_sheet(&month).unwrap();

        // Saving again replaces rather than merges.
        month.grid.set_cell(4, 2, "");
        month.grid.set_cell(5, 2, "出");
        db.save_sheet(&month).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.sheet_names().unwrap(), vec!["template", "202404"]);
    let month = db.require_sheet("202404").unwrap();
    assert_eq!(month.grid.row(4), vec!["田中", "", ""]);
    assert_eq!(month.grid.row(5), vec!["佐藤", "", "出"]);
    assert_eq!(month.grid.height(), 6);
    assert_eq!(month.grid.width(), 3);
    assert!(db.sheet("202405").unwrap().is_none());
}

#[test]
fn test_service_over_sqlite_queues_daily_notice() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("attendance.db");
    let mut store = Database::open_at(&path).unwrap();
    store.save_sheet(&template()).unwrap();

    let mut config = Config::default();
    config.notification.address = Some("members@example.com".into());
    let mailer = OutboxMailer::new(Database::open_at(&path).unwrap());
    let mut svc = AttendanceService::new(config, store, OneSession, mailer).unwrap();

    svc.sync_month(2024, 4).unwrap();
    svc.update_member_row("202404", "佐藤", &["", "出"]).unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
    let outcome = svc.send_daily_notice(date).unwrap();
    assert!(matches!(outcome, Outcome::Done(_)));

    let queued = svc.mailer().database().outbox(10).unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].recipient, "members@example.com");
    assert!(queued[0].html_body.contains("[参加者]: 佐藤<br/>"));
    assert!(queued[0].html_body.contains("[鍵開け担当者]: ※登録なし・要確認<br/>"));
}

#[test]
fn test_config_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.set("notification.address", "members@example.com").unwrap();
    config.set("labels.organization", "青葉会").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(
        loaded.get("notification.address").as_deref(),
        Some("members@example.com")
    );
    assert_eq!(loaded.labels.organization, "青葉会");
    assert_eq!(loaded.mail.transport, MailTransport::Outbox);
}

#[test]
fn test_config_file_with_bad_weekdays_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[labels]\nweekdays = [\"日\", \"月\"]\n").unwrap();

    assert!(Config::load_from(&path).is_err());
}

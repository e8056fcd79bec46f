//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temporary
//! directory, so config, database and outbox start empty.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_attendance-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("ATTENDANCE_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

/// Home with a template sheet and an April 2024 event file.
fn seeded_home() -> TempDir {
    let home = TempDir::new().unwrap();
    let template = home.path().join("template.json");
    std::fs::write(
        &template,
        r#"[["", ""], ["", ""], ["", ""], ["", ""], ["田中", ""], ["佐藤", ""]]"#,
    )
    .unwrap();
    let events = home.path().join("events.json");
    std::fs::write(
        &events,
        r#"[
            {"start": "2024-04-02T19:00:00", "end": "2024-04-02T21:00:00", "title": "創玄会@公園"},
            {"start": "2024-04-09T19:00:00", "end": "2024-04-09T21:00:00", "title": "自主練", "location": "道場"}
        ]"#,
    )
    .unwrap();

    run_ok(
        home.path(),
        &["sheet", "import", "template", template.to_str().unwrap()],
    );
    home
}

fn sync_april(home: &Path) -> String {
    let events = home.join("events.json");
    run_ok(
        home,
        &["sync", "202404", "--events", events.to_str().unwrap()],
    )
}

#[test]
fn test_sync_and_list() {
    let home = seeded_home();

    let out = sync_april(home.path());
    assert!(out.contains("202404: 2 inserted"));
    assert!(out.contains("4/2(火) 19:00-21:00 正規練 @公園"));

    let out = run_ok(home.path(), &["list", "202404", "--json"]);
    let rows: Vec<Vec<String>> = serde_json::from_str(&out).unwrap();
    assert_eq!(rows[0], vec!["", "", "4/2(火)", "4/9(火)"]);
    assert_eq!(rows[4][0], "田中");

    let out = run_ok(home.path(), &["sheets"]);
    assert_eq!(out.trim(), "202404");
}

#[test]
fn test_sync_empty_month() {
    let home = seeded_home();
    let events = home.path().join("events.json");

    let out = run_ok(
        home.path(),
        &["sync", "202405", "--events", events.to_str().unwrap()],
    );
    assert!(out.contains("該当月のカレンダーにはイベントが存在しませんでした"));
}

#[test]
fn test_list_missing_month_fails() {
    let home = seeded_home();

    let (_, stderr, code) = run_cli(home.path(), &["list", "203001"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: 該当月の稽古日程は未登録です。"));
}

#[test]
fn test_member_update_unknown_member_fails() {
    let home = seeded_home();
    sync_april(home.path());

    let (_, stderr, code) = run_cli(home.path(), &["member", "update", "202404", "山田", "出"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("指定された名前が存在しません。"));
}

#[test]
fn test_daily_notice_is_queued() {
    let home = seeded_home();
    sync_april(home.path());
    run_ok(
        home.path(),
        &["config", "set", "notification.address", "members@example.com"],
    );
    run_ok(home.path(), &["member", "update", "202404", "田中", "", "鍵"]);
    run_ok(home.path(), &["member", "update", "202404", "佐藤", "", "出"]);

    let out = run_ok(home.path(), &["notify", "daily", "--date", "2024-04-02"]);
    assert!(out.contains("sent: 創玄会 4/2の稽古参加者"));

    let out = run_ok(home.path(), &["outbox", "list", "--json"]);
    let queued: serde_json::Value = serde_json::from_str(&out).unwrap();
    let body = queued[0]["html_body"].as_str().unwrap();
    assert!(body.contains("[鍵開け担当者]: 田中<br/>"));
    assert!(body.contains("[参加者]: 佐藤<br/>"));
}

#[test]
fn test_daily_notice_without_address_is_skipped() {
    let home = seeded_home();
    sync_april(home.path());

    let out = run_ok(home.path(), &["notify", "daily", "--date", "2024-04-02"]);
    assert!(out.contains("通知先アドレスが正しく設定されていません"));
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();

    let out = run_ok(home.path(), &["config", "get", "labels.organization"]);
    assert_eq!(out.trim(), "創玄会");

    run_ok(home.path(), &["config", "set", "labels.organization", "青葉会"]);
    let out = run_ok(home.path(), &["config", "get", "labels.organization"]);
    assert_eq!(out.trim(), "青葉会");

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_empty_value_unsets() {
    let home = TempDir::new().unwrap();

    run_ok(
        home.path(),
        &["config", "set", "notification.address", "members@example.com"],
    );
    run_ok(home.path(), &["config", "set", "notification.address", ""]);
    let out = run_ok(home.path(), &["config", "get", "notification.address"]);
    assert_eq!(out.trim(), "null");

    run_ok(
        home.path(),
        &["auth", "webhook", "login", "--url", "http://127.0.0.1:9/relay"],
    );
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "mail.webhook_url", ""]);
    assert_eq!(code, 1);
    assert!(stderr.contains("mail.webhook_url"));
    let (_, _, code) = run_cli(home.path(), &["auth", "webhook", "login", "--url", " "]);
    assert_eq!(code, 1);

    let out = run_ok(home.path(), &["auth", "webhook", "status"]);
    assert!(out.contains("webhook (http://127.0.0.1:9/relay)"));
}

#[test]
fn test_webhook_transport_switch() {
    let home = TempDir::new().unwrap();

    run_ok(
        home.path(),
        &["auth", "webhook", "login", "--url", "http://127.0.0.1:9/relay"],
    );
    let out = run_ok(home.path(), &["auth", "webhook", "status"]);
    assert!(out.contains("webhook (http://127.0.0.1:9/relay)"));

    run_ok(home.path(), &["auth", "webhook", "logout"]);
    let out = run_ok(home.path(), &["auth", "webhook", "status"]);
    assert_eq!(out.trim(), "mail transport: outbox");
}

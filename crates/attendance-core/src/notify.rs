//! Notification mail composition.
//!
//! Two notices exist: the daily list of who attends tomorrow's sessions, and
//! the monthly schedule announcement with the registration link. Both are
//! HTML fragments using `<br/>` line breaks.

use chrono::{Datelike, NaiveDate};
use indoc::formatdoc;

use crate::aggregate::SessionAttendance;
use crate::error::ConfigError;
use crate::integrations::OutgoingMail;
use crate::normalize::Labels;
use crate::sheet::sheet_label;
use crate::storage::NotificationConfig;

pub const ADDRESS_KEY: &str = "notification.address";
pub const CC_ADDRESS_KEY: &str = "notification.cc_address";

/// User-facing text for a notification setting that is missing.
pub fn missing_setting_message(err: &ConfigError) -> String {
    match err {
        ConfigError::MissingKey(key) if key == ADDRESS_KEY => {
            "通知先アドレスが正しく設定されていません".to_string()
        }
        ConfigError::MissingKey(key) if key == CC_ADDRESS_KEY => {
            "通知先CCアドレスが正しく設定されていません".to_string()
        }
        other => other.to_string(),
    }
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

/// Daily notice for the sessions held on `date`.
pub fn daily_notice(
    date: NaiveDate,
    sessions: &[SessionAttendance],
    config: &NotificationConfig,
    labels: &Labels,
) -> Result<OutgoingMail, ConfigError> {
    let to = require(&config.address, ADDRESS_KEY)?;
    let blocks = sessions
        .iter()
        .map(SessionAttendance::render)
        .collect::<Vec<_>>()
        .join("<br/>");

    let html_body = formatdoc! {"
        みなさま<br/>
        <br/>
        お疲れさまです。出欠管理より明日の稽古場所および参加者をお知らせします。<br/>
        <br/>
        {blocks}<br/>
        <br/>
        ※このメールは自動送信です。<br/>
    "};

    Ok(OutgoingMail {
        name: config.sender_name(labels),
        to: to.to_string(),
        cc: None,
        subject: format!(
            "{} {}/{}の稽古参加者",
            labels.organization,
            date.month(),
            date.day()
        ),
        html_body,
    })
}

/// Monthly schedule announcement. `supplement` is an optional note from the
/// person sending it.
pub fn monthly_announcement(
    year: i32,
    month: u32,
    schedule: &str,
    supplement: Option<&str>,
    config: &NotificationConfig,
    labels: &Labels,
) -> Result<OutgoingMail, ConfigError> {
    let to = require(&config.address, ADDRESS_KEY)?;
    let cc = require(&config.cc_address, CC_ADDRESS_KEY)?;

    let supplement = match supplement.filter(|s| !s.is_empty()) {
        Some(text) => format!("[担当者からの補足]<br/>{text}"),
        None => String::new(),
    };
    let url = config.registration_url(&sheet_label(year, month));

    let html_body = formatdoc! {"
        みなさま<br/>
        <br/>
        お世話になっております。{month}月の稽古日程をお知らせします。<br/>
        <br/>
        {schedule}<br/>
        <br/>
        {supplement}<br/>
        ------<br/>
        以下のリンクから出欠登録をお願いします。<br/>
        {url} <br/>
        <br/>
    "};

    Ok(OutgoingMail {
        name: config.sender_name(labels),
        to: to.to_string(),
        cc: Some(cc.to_string()),
        subject: format!("{} {}月 稽古日程のお知らせ", labels.organization, month),
        html_body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::StatusGroups;
    use crate::grid::SessionHeader;

    fn config() -> NotificationConfig {
        NotificationConfig {
            address: Some("members@example.com".into()),
            cc_address: Some("lead@example.com".into()),
            deploy_id: Some("DEPLOY".into()),
            ..NotificationConfig::default()
        }
    }

    fn session() -> SessionAttendance {
        SessionAttendance {
            header: SessionHeader {
                date: "4/2(火)".into(),
                time: "19:00-21:00".into(),
                name: "正規練".into(),
                place: "公園".into(),
            },
            groups: StatusGroups {
                key_holders: vec!["田中".into()],
                joiners: vec!["佐藤".into()],
                ..StatusGroups::default()
            },
        }
    }

    #[test]
    fn daily_notice_lists_sessions() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let mail = daily_notice(date, &[session(), session()], &config(), &Labels::default()).unwrap();
        assert_eq!(mail.subject, "創玄会 4/2の稽古参加者");
        assert_eq!(mail.to, "members@example.com");
        assert!(mail.cc.is_none());
        assert!(mail.html_body.starts_with("みなさま<br/>\n"));
        assert_eq!(mail.html_body.matches("[鍵開け担当者]: 田中").count(), 2);
        assert!(mail.html_body.contains("※このメールは自動送信です。"));
    }

    #[test]
    fn daily_notice_requires_address() {
        let mut cfg = config();
        cfg.address = None;
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let err = daily_notice(date, &[session()], &cfg, &Labels::default()).unwrap_err();
        assert_eq!(missing_setting_message(&err), "通知先アドレスが正しく設定されていません");
    }

    #[test]
    fn monthly_announcement_links_sheet() {
        let mail = monthly_announcement(
            2024,
            4,
            "4/2(火) 19:00-21:00<br/> 正規練 @公園<br/>",
            Some("雨天中止"),
            &config(),
            &Labels::default(),
        )
        .unwrap();
        assert_eq!(mail.subject, "創玄会 4月 稽古日程のお知らせ");
        assert_eq!(mail.cc.as_deref(), Some("lead@example.com"));
        assert_eq!(mail.name, "創玄会 出欠管理システム");
        assert!(mail.html_body.contains("4月の稽古日程をお知らせします"));
        assert!(mail.html_body.contains("[担当者からの補足]<br/>雨天中止"));
        assert!(mail
            .html_body
            .contains("https://script.google.com/macros/s/DEPLOY/exec?sheetName=202404"));
    }

    #[test]
    fn monthly_announcement_omits_empty_supplement() {
        let mail = monthly_announcement(2024, 4, "", Some(""), &config(), &Labels::default()).unwrap();
        assert!(!mail.html_body.contains("[担当者からの補足]"));
    }

    #[test]
    fn monthly_announcement_requires_cc() {
        let mut cfg = config();
        cfg.cc_address = Some(String::new());
        let err = monthly_announcement(2024, 4, "", None, &cfg, &Labels::default()).unwrap_err();
        assert_eq!(missing_setting_message(&err), "通知先CCアドレスが正しく設定されていません");
    }
}

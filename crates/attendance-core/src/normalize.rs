//! Calendar event normalization.
//!
//! Reduces a raw calendar event to the four display fields written into a
//! sheet's header rows. Titles may carry the place as `name@place`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::grid::SessionHeader;

/// A calendar event as returned by a [`CalendarSource`](crate::integrations::CalendarSource).
///
/// Times are local wall-clock times of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Display constants used when normalizing events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// Organization name removed from event titles.
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Name used when a title has nothing left after stripping.
    #[serde(default = "default_event_name")]
    pub default_event_name: String,
    /// Place used when neither the title nor the event has one.
    #[serde(default = "default_no_location")]
    pub no_location: String,
    /// Day-of-week symbols, Sunday first.
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<String>,
}

fn default_organization() -> String {
    "創玄会".into()
}
fn default_event_name() -> String {
    "正規練".into()
}
fn default_no_location() -> String {
    "場所情報なし".into()
}
fn default_weekdays() -> Vec<String> {
    ["日", "月", "火", "水", "木", "金", "土"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            default_event_name: default_event_name(),
            no_location: default_no_location(),
            weekdays: default_weekdays(),
        }
    }
}

/// An event reduced to the fields stored in a sheet column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub date: String,
    pub time: String,
    pub name: String,
    pub place: String,
}

impl NormalizedEvent {
    /// Column key.
    pub fn key(&self) -> (&str, &str) {
        (&self.date, &self.time)
    }

    pub fn header(&self) -> SessionHeader {
        SessionHeader {
            date: self.date.clone(),
            time: self.time.clone(),
            name: self.name.clone(),
            place: self.place.clone(),
        }
    }

    /// One entry of the monthly schedule announcement.
    pub fn schedule_line(&self) -> String {
        self.header().schedule_line()
    }
}

/// `M/D(w)` label for a day, e.g. `1/2(火)`.
pub fn date_label(date: NaiveDate, labels: &Labels) -> String {
    let weekday = labels
        .weekdays
        .get(date.weekday().num_days_from_sunday() as usize)
        .map(String::as_str)
        .unwrap_or("");
    format!("{}/{}({})", date.month(), date.day(), weekday)
}

/// `H:MM-H:MM` label for a session.
pub fn time_label(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{}:{:02}-{}:{:02}",
        start.hour(),
        start.minute(),
        end.hour(),
        end.minute()
    )
}

pub fn normalize(event: &CalendarEvent, labels: &Labels) -> NormalizedEvent {
    let (raw_name, title_place) = match event.title.split_once('@') {
        Some((name, place)) => (name, Some(place)),
        None => (event.title.as_str(), None),
    };

    let name = if labels.organization.is_empty() {
        raw_name.to_string()
    } else {
        raw_name.replacen(labels.organization.as_str(), "", 1)
    };
    let name = if name.is_empty() {
        labels.default_event_name.clone()
    } else {
        name
    };

    let place = match title_place {
        Some(place) => place.to_string(),
        None => event
            .location
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(labels.no_location.as_str())
            .to_string(),
    };

    NormalizedEvent {
        date: date_label(event.start.date(), labels),
        time: time_label(event.start, event.end),
        name,
        place,
    }
}

pub fn normalize_all(events: &[CalendarEvent], labels: &Labels) -> Vec<NormalizedEvent> {
    events.iter().map(|e| normalize(e, labels)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn event(title: &str, location: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            start: at(2, 19, 0),
            end: at(2, 21, 30),
            title: title.to_string(),
            location: location.map(String::from),
        }
    }

    #[test]
    fn formats_date_and_time() {
        let n = normalize(&event("自主練@公園", None), &Labels::default());
        // 2024-01-02 is a Tuesday.
        assert_eq!(n.date, "1/2(火)");
        assert_eq!(n.time, "19:00-21:30");
    }

    #[test]
    fn hours_are_not_padded_but_minutes_are() {
        assert_eq!(time_label(at(3, 9, 5), at(3, 10, 0)), "9:05-10:00");
    }

    #[test]
    fn sunday_is_first_weekday_symbol() {
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(date_label(sunday, &Labels::default()), "1/7(日)");
    }

    #[test]
    fn strips_organization_and_splits_place() {
        let n = normalize(&event("創玄会合同稽古@体育館", Some("別会場")), &Labels::default());
        assert_eq!(n.name, "合同稽古");
        assert_eq!(n.place, "体育館");
    }

    #[test]
    fn empty_name_becomes_default_label() {
        let n = normalize(&event("創玄会@公園", None), &Labels::default());
        assert_eq!(n.name, "正規練");
    }

    #[test]
    fn place_falls_back_to_location_then_placeholder() {
        let labels = Labels::default();
        assert_eq!(normalize(&event("稽古", Some("道場")), &labels).place, "道場");
        assert_eq!(normalize(&event("稽古", Some("")), &labels).place, "場所情報なし");
        assert_eq!(normalize(&event("稽古", None), &labels).place, "場所情報なし");
    }

    #[test]
    fn only_first_at_sign_splits() {
        let n = normalize(&event("稽古@公園@東口", None), &Labels::default());
        assert_eq!(n.name, "稽古");
        assert_eq!(n.place, "公園@東口");
    }

    #[test]
    fn schedule_line_matches_announcement_format() {
        let n = normalize(&event("創玄会@公園", None), &Labels::default());
        assert_eq!(n.schedule_line(), "1/2(火) 19:00-21:30<br/> 正規練 @公園<br/>");
    }
}

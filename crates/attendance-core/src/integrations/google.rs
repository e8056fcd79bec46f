//! Google Calendar source.
//!
//! Lists the practice calendar's events for a month through the Calendar v3
//! `events.list` endpoint, authenticating with an API key kept in the OS
//! keyring. Recurring events are expanded by the API (`singleEvents=true`).

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::keyring_store;
use super::traits::CalendarSource;
use crate::error::{CoreError, Result};
use crate::normalize::CalendarEvent;
use crate::storage::CalendarConfig;

const SERVICE: &str = "google";
/// Keyring entry holding the API key.
pub const API_KEY_ENTRY: &str = "google_api_key";

/// Google Calendar event source.
pub struct GoogleCalendarSource {
    api_base: String,
    calendar_id: Option<String>,
    /// Explicit key; `None` reads the keyring when a request is made.
    api_key: Option<String>,
}

impl GoogleCalendarSource {
    /// Build from config. The API key is read from the keyring on first use.
    pub fn new(config: &CalendarConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone().filter(|id| !id.is_empty()),
            api_key: None,
        }
    }

    pub fn with_api_key(config: &CalendarConfig, api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::new(config)
        }
    }

    /// Whether an API key is available.
    pub fn has_credentials(&self) -> bool {
        !self.api_key().is_empty()
    }

    fn api_key(&self) -> String {
        match &self.api_key {
            Some(key) => key.clone(),
            None => keyring_store::get(API_KEY_ENTRY)
                .ok()
                .flatten()
                .unwrap_or_default(),
        }
    }

    /// Persist the API key to the OS keyring.
    pub fn set_credentials(api_key: &str) -> Result<()> {
        keyring_store::set(API_KEY_ENTRY, api_key)
    }

    pub fn clear_credentials() -> Result<()> {
        keyring_store::delete(API_KEY_ENTRY)
    }

    fn events_url(&self, calendar_id: &str, year: i32, month: u32) -> Result<Url> {
        let (time_min, time_max) = month_bounds(year, month)?;
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| CoreError::integration(SERVICE, "invalid api_base", Some(Box::new(e))))?;
        url.path_segments_mut()
            .map_err(|_| CoreError::integration(SERVICE, "api_base cannot be a base URL", None))?
            .extend(["calendars", calendar_id, "events"]);
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339())
            .append_pair("timeMax", &time_max.to_rfc3339())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime")
            .append_pair("maxResults", "2500");
        let api_key = self.api_key();
        if !api_key.is_empty() {
            url.query_pairs_mut().append_pair("key", &api_key);
        }
        Ok(url)
    }

    async fn fetch_pages(&self, url: Url) -> Result<Vec<serde_json::Value>> {
        let client = Client::new();
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut page_url = url.clone();
            if let Some(token) = &page_token {
                page_url.query_pairs_mut().append_pair("pageToken", token);
            }

            let resp: serde_json::Value = client
                .get(page_url)
                .send()
                .await
                .map_err(|e| CoreError::integration(SERVICE, "request failed", Some(Box::new(e))))?
                .json()
                .await
                .map_err(|e| CoreError::integration(SERVICE, "invalid response body", Some(Box::new(e))))?;

            if let Some(err) = resp.get("error") {
                return Err(CoreError::integration(
                    SERVICE,
                    format!("Google Calendar API error: {err}"),
                    None,
                ));
            }

            let page = resp["items"]
                .as_array()
                .ok_or_else(|| CoreError::integration(SERVICE, "missing items in response", None))?;
            items.extend(page.iter().cloned());

            match resp["nextPageToken"].as_str() {
                Some(token) => page_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(items)
    }
}

impl CalendarSource for GoogleCalendarSource {
    fn name(&self) -> &str {
        SERVICE
    }

    fn events(&self, year: i32, month: u32) -> Result<Vec<CalendarEvent>> {
        let Some(calendar_id) = self.calendar_id.as_deref() else {
            warn!("calendar.calendar_id is not configured; treating the month as empty");
            return Ok(Vec::new());
        };

        let url = self.events_url(calendar_id, year, month)?;
        let items = super::blocking_runtime(SERVICE)?.block_on(self.fetch_pages(url))?;
        debug!(count = items.len(), year, month, "fetched calendar items");

        items
            .iter()
            .filter(|item| item["status"].as_str() != Some("cancelled"))
            .map(parse_item)
            .collect()
    }
}

/// Local midnight at the start of the month and of the following month.
fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let invalid = || CoreError::integration(SERVICE, format!("invalid month {year}-{month}"), None);
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    let local = |d: NaiveDate| {
        Local
            .from_local_datetime(&d.and_time(chrono::NaiveTime::MIN))
            .earliest()
            .ok_or_else(invalid)
    };
    Ok((local(first)?, local(next)?))
}

/// Start or end of an item as local wall-clock time. All-day events use
/// midnight.
fn parse_time(value: &serde_json::Value, field: &str) -> Result<NaiveDateTime> {
    if let Some(s) = value["dateTime"].as_str() {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CoreError::integration(SERVICE, format!("invalid {field} time '{s}'"), Some(Box::new(e)))
        })?;
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    if let Some(s) = value["date"].as_str() {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
            CoreError::integration(SERVICE, format!("invalid {field} date '{s}'"), Some(Box::new(e)))
        })?;
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    Err(CoreError::integration(
        SERVICE,
        format!("missing {field} time"),
        None,
    ))
}

fn parse_item(item: &serde_json::Value) -> Result<CalendarEvent> {
    Ok(CalendarEvent {
        start: parse_time(&item["start"], "start")?,
        end: parse_time(&item["end"], "end")?,
        title: item["summary"].as_str().unwrap_or_default().to_string(),
        location: item["location"].as_str().map(String::from),
    })
}

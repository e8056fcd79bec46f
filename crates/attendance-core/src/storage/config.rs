//! TOML-based application configuration.
//!
//! Stores deployment settings including:
//! - The source calendar id
//! - Notification addresses and the registration link template
//! - Labels used when normalizing calendar events
//! - Mail transport selection
//!
//! Configuration is stored at `~/.config/attendance/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::normalize::Labels;

/// Calendar source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Google Calendar id of the practice calendar.
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Recipient of every notice.
    #[serde(default)]
    pub address: Option<String>,
    /// CC recipient of the monthly announcement.
    #[serde(default)]
    pub cc_address: Option<String>,
    /// Deployment id substituted into `url_template`.
    #[serde(default)]
    pub deploy_id: Option<String>,
    /// Registration link. `{deploy_id}` and `{sheet}` are substituted.
    #[serde(default = "default_url_template")]
    pub url_template: String,
    /// Display name of the sender. Defaults to `{organization} 出欠管理システム`.
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailTransport {
    /// Queue messages in the local database.
    Outbox,
    /// POST messages as JSON to `webhook_url`.
    Webhook,
}

/// Mail transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_transport")]
    pub transport: MailTransport,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/attendance/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub mail: MailConfig,
}

// Default functions
fn default_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}
fn default_url_template() -> String {
    "https://script.google.com/macros/s/{deploy_id}/exec?sheetName={sheet}".into()
}
fn default_transport() -> MailTransport {
    MailTransport::Outbox
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: None,
            api_base: default_api_base(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            address: None,
            cc_address: None,
            deploy_id: None,
            url_template: default_url_template(),
            sender_name: None,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            webhook_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            notification: NotificationConfig::default(),
            labels: Labels::default(),
            mail: MailConfig::default(),
        }
    }
}

impl NotificationConfig {
    /// Registration link for a sheet.
    pub fn registration_url(&self, sheet: &str) -> String {
        self.url_template
            .replace("{deploy_id}", self.deploy_id.as_deref().unwrap_or(""))
            .replace("{sheet}", sheet)
    }

    pub fn sender_name(&self, labels: &Labels) -> String {
        self.sender_name
            .clone()
            .unwrap_or_else(|| format!("{} 出欠管理システム", labels.organization))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
        optional: bool,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::MissingKey("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    // Optional fields: an empty value unsets them.
                    _ if optional && value.is_empty() => serde_json::Value::Null,
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `~/.config/attendance/config.toml`, writing the defaults
    /// there on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a config file at an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.weekdays.len() != 7 {
            return Err(ConfigError::InvalidValue {
                key: "labels.weekdays".into(),
                message: format!("expected 7 symbols, got {}", self.labels.weekdays.len()),
            });
        }
        if self.labels.default_event_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "labels.default_event_name".into(),
                message: "must not be empty".into(),
            });
        }
        let webhook_url = self.mail.webhook_url.as_deref().map(str::trim);
        if self.mail.transport == MailTransport::Webhook
            && webhook_url.map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingKey("mail.webhook_url".into()));
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if the key is
    /// unknown or the result does not validate.
    ///
    /// An empty value unsets an optional field, i.e. one that is `null` in
    /// the default config.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let defaults = serde_json::to_value(Self::default())?;
        let optional = Self::get_json_value_by_path(&defaults, key)
            .is_some_and(serde_json::Value::is_null);
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value, optional)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

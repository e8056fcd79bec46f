mod config;
pub mod database;
pub mod store;

pub use config::{CalendarConfig, Config, MailConfig, MailTransport, NotificationConfig};
pub use database::{Database, OutboxRecord};
pub use store::{MemorySheetStore, SheetStore};

use std::path::PathBuf;

/// Returns `~/.config/attendance[-dev]/` based on ATTENDANCE_ENV.
///
/// Set ATTENDANCE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ATTENDANCE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("attendance-dev")
    } else {
        base_dir.join("attendance")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

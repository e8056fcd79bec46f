pub mod file;
pub mod google;
pub mod outbox;
pub mod traits;
pub mod webhook;

pub use file::FileCalendarSource;
pub use google::GoogleCalendarSource;
pub use outbox::OutboxMailer;
pub use traits::{CalendarSource, MailSender, OutgoingMail};
pub use webhook::WebhookMailer;

use crate::error::{CoreError, Result};

/// Current-thread runtime for driving reqwest from synchronous callers.
pub(crate) fn blocking_runtime(service: &str) -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CoreError::integration(service, "failed to start runtime", Some(Box::new(e))))
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::{CoreError, Result};

    const SERVICE: &str = "attendance";

    fn keyring_error(e: keyring::Error) -> CoreError {
        CoreError::integration("keyring", e.to_string(), Some(Box::new(e)))
    }

    pub fn get(key: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(keyring_error)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(keyring_error)?;
        entry.set_password(value).map_err(keyring_error)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE, key).map_err(keyring_error)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::CalendarEvent;

/// Read-only source of practice sessions.
pub trait CalendarSource {
    /// Unique identifier (e.g. "google", "file").
    fn name(&self) -> &str;

    /// Events starting within the given month, in start order.
    ///
    /// An unconfigured source returns an empty list rather than an error.
    fn events(&self, year: i32, month: u32) -> Result<Vec<CalendarEvent>>;
}

/// A notification ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMail {
    /// Display name of the sender.
    pub name: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// Fire-and-forget mail transport. Success means the transport accepted the
/// message, not that it was delivered.
pub trait MailSender {
    fn name(&self) -> &str;

    fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

impl<T: CalendarSource + ?Sized> CalendarSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn events(&self, year: i32, month: u32) -> Result<Vec<CalendarEvent>> {
        (**self).events(year, month)
    }
}

impl<T: MailSender + ?Sized> MailSender for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, mail: &OutgoingMail) -> Result<()> {
        (**self).send(mail)
    }
}

//! Mail transport that queues messages in the local database.
//!
//! Another process (or a person) drains the outbox; see `attendance-cli
//! outbox list`.

use chrono::Utc;
use tracing::info;

use super::traits::{MailSender, OutgoingMail};
use crate::error::Result;
use crate::storage::{Database, OutboxRecord};

pub struct OutboxMailer {
    db: Database,
}

impl OutboxMailer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl MailSender for OutboxMailer {
    fn name(&self) -> &str {
        "outbox"
    }

    fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let record = OutboxRecord {
            id: format!("mail-{}", uuid::Uuid::new_v4()),
            sender: mail.name.clone(),
            recipient: mail.to.clone(),
            cc: mail.cc.clone(),
            subject: mail.subject.clone(),
            html_body: mail.html_body.clone(),
            queued_at: Utc::now(),
        };
        self.db.insert_outbox(&record)?;
        info!(id = %record.id, to = %record.recipient, subject = %record.subject, "queued mail");
        Ok(())
    }
}

//! Webhook mail transport -- POST each message as JSON to a mail relay.

use reqwest::Client;
use tracing::info;

use super::traits::{MailSender, OutgoingMail};
use crate::error::{CoreError, Result};

const SERVICE: &str = "webhook";

pub struct WebhookMailer {
    url: String,
}

impl WebhookMailer {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn post(&self, mail: &OutgoingMail) -> Result<()> {
        let resp = Client::new()
            .post(&self.url)
            .json(mail)
            .send()
            .await
            .map_err(|e| CoreError::integration(SERVICE, "request failed", Some(Box::new(e))))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(CoreError::integration(
                SERVICE,
                format!("mail relay error (HTTP {status}): {text}"),
                None,
            ))
        }
    }
}

impl MailSender for WebhookMailer {
    fn name(&self) -> &str {
        SERVICE
    }

    fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if self.url.is_empty() {
            return Err(CoreError::integration(
                SERVICE,
                "mail.webhook_url not configured",
                None,
            ));
        }
        super::blocking_runtime(SERVICE)?.block_on(self.post(mail))?;
        info!(to = %mail.to, subject = %mail.subject, "posted mail to relay");
        Ok(())
    }
}

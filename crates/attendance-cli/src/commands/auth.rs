use attendance_core::integrations::GoogleCalendarSource;
use attendance_core::storage::MailTransport;
use attendance_core::Config;
use clap::Subcommand;

use super::CliResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Google Calendar: login / logout / status
    Google {
        #[command(subcommand)]
        action: GoogleOp,
    },
    /// Mail relay webhook: login / logout / status
    Webhook {
        #[command(subcommand)]
        action: WebhookOp,
    },
}

#[derive(Subcommand)]
pub enum GoogleOp {
    /// Store the Calendar API key
    Login {
        /// Google API key with Calendar read access
        #[arg(long)]
        api_key: String,
        /// Calendar id of the practice calendar
        #[arg(long)]
        calendar_id: Option<String>,
    },
    /// Remove the stored API key
    Logout,
    /// Check whether a key and calendar id are configured
    Status,
}

#[derive(Subcommand)]
pub enum WebhookOp {
    /// Send mail through a relay webhook
    Login {
        /// Relay URL receiving JSON POSTs
        #[arg(long)]
        url: String,
    },
    /// Go back to queuing mail in the local outbox
    Logout,
    /// Show the active mail transport
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::Google { action } => handle_google(action),
        AuthAction::Webhook { action } => handle_webhook(action),
    }
}

fn handle_google(op: GoogleOp) -> CliResult {
    match op {
        GoogleOp::Login {
            api_key,
            calendar_id,
        } => {
            GoogleCalendarSource::set_credentials(&api_key)?;
            if let Some(id) = calendar_id {
                let mut config = Config::load()?;
                config.calendar.calendar_id = Some(id);
                config.save()?;
            }
            println!("Google credentials stored");
        }
        GoogleOp::Logout => {
            GoogleCalendarSource::clear_credentials()?;
            println!("Google disconnected");
        }
        GoogleOp::Status => {
            let config = Config::load()?;
            let source = GoogleCalendarSource::new(&config.calendar);
            println!(
                "{}",
                if source.has_credentials() {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
            match config.calendar.calendar_id {
                Some(id) => println!("calendar: {id}"),
                None => println!("calendar: not configured"),
            }
        }
    }
    Ok(())
}

fn handle_webhook(op: WebhookOp) -> CliResult {
    let mut config = Config::load()?;
    match op {
        WebhookOp::Login { url } => {
            config.mail.webhook_url = Some(url);
            config.mail.transport = MailTransport::Webhook;
            config.validate()?;
            config.save()?;
            println!("mail transport: webhook");
        }
        WebhookOp::Logout => {
            config.mail.transport = MailTransport::Outbox;
            config.mail.webhook_url = None;
            config.save()?;
            println!("mail transport: outbox");
        }
        WebhookOp::Status => match (config.mail.transport, &config.mail.webhook_url) {
            (MailTransport::Webhook, Some(url)) => println!("mail transport: webhook ({url})"),
            _ => println!("mail transport: outbox"),
        },
    }
    Ok(())
}

use attendance_core::Database;
use clap::Subcommand;

use super::CliResult;

#[derive(Subcommand)]
pub enum OutboxAction {
    /// Show queued mail, newest first
    List {
        /// Maximum number of messages
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Include message bodies as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: OutboxAction) -> CliResult {
    let db = Database::open()?;

    match action {
        OutboxAction::List { limit, json } => {
            let records = db.outbox(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for r in records {
                    println!(
                        "{}\t{}\t{}\t{}",
                        r.queued_at.format("%Y-%m-%d %H:%M"),
                        r.recipient,
                        r.cc.as_deref().unwrap_or("-"),
                        r.subject
                    );
                }
            }
        }
    }
    Ok(())
}

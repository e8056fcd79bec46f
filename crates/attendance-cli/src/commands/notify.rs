//! Notify subcommand: daily attendee list and monthly schedule announcement.

use std::path::PathBuf;

use attendance_core::Outcome;
use chrono::{Days, Local, NaiveDate};
use clap::Subcommand;

use super::{month_arg, next_month_label, open_service, CliResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Send who attends the sessions on a day (default: tomorrow)
    Daily {
        /// Session day as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Send a month's schedule with the registration link
    Monthly {
        /// Month as YYYYMM (default: next month)
        month: Option<String>,
        /// Supplementary note appended to the announcement
        #[arg(long)]
        note: Option<String>,
        /// Sync the month with the calendar before announcing
        #[arg(long)]
        sync: bool,
        /// Read events from a JSON file instead of Google Calendar
        #[arg(long, requires = "sync")]
        events: Option<PathBuf>,
    },
}

pub fn run(action: NotifyAction) -> CliResult {
    let outcome = match action {
        NotifyAction::Daily { date } => {
            let date = match date {
                Some(date) => date,
                None => Local::now()
                    .date_naive()
                    .checked_add_days(Days::new(1))
                    .ok_or("date out of range")?,
            };
            open_service(None)?.send_daily_notice(date)?
        }
        NotifyAction::Monthly {
            month,
            note,
            sync,
            events,
        } => {
            let label = month.unwrap_or_else(next_month_label);
            let (year, month) = month_arg(Some(label.as_str()))?;
            let mut service = open_service(events.as_deref())?;
            if sync {
                let report = service.sync_month(year, month)?;
                if !report.outcome.is_done() {
                    println!("{}", report.outcome.message());
                    return Ok(());
                }
            }
            service.send_monthly_announcement(year, month, note.as_deref())?
        }
    };

    match outcome {
        Outcome::Done(subject) => println!("sent: {subject}"),
        Outcome::Empty(message) | Outcome::Skipped(message) => println!("{message}"),
    }
    Ok(())
}

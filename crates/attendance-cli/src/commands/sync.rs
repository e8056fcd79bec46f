//! Sync subcommand: reconcile a month sheet with the calendar.

use std::path::PathBuf;

use attendance_core::Outcome;
use clap::Args;

use super::{month_arg, next_month_label, open_service, CliResult};

#[derive(Args)]
pub struct SyncArgs {
    /// Month as YYYYMM (default: current month)
    month: Option<String>,
    /// Sync next month instead of the current one
    #[arg(long, conflicts_with = "month")]
    next: bool,
    /// Read events from a JSON file instead of Google Calendar
    #[arg(long)]
    events: Option<PathBuf>,
    /// Output the sync report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: SyncArgs) -> CliResult {
    let label = if args.next {
        Some(next_month_label())
    } else {
        args.month
    };
    let (year, month) = month_arg(label.as_deref())?;
    let mut service = open_service(args.events.as_deref())?;
    let report = service.sync_month(year, month)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.outcome {
        Outcome::Done(schedule) => {
            if let Some(summary) = &report.summary {
                println!("{}: {}", report.sheet, summary.message());
            }
            for line in schedule.split("<br/><br/>") {
                println!("{}", line.replace("<br/>", ""));
            }
        }
        Outcome::Empty(message) | Outcome::Skipped(message) => println!("{message}"),
    }
    Ok(())
}

use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Subcommand};

use super::{open_service, CliResult};

#[derive(Args)]
pub struct ListArgs {
    /// Sheet name: YYYYMM or "template" (default: current month)
    name: Option<String>,
    /// Output rows as a JSON array
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
pub enum SheetAction {
    /// Create or replace a sheet from a JSON array of rows
    Import {
        /// Sheet name: YYYYMM or "template"
        name: String,
        /// JSON file holding an array of string arrays
        file: PathBuf,
    },
}

pub fn list(args: ListArgs) -> CliResult {
    let service = open_service(None)?;
    let sheet = service.list_sheet(args.name.as_deref(), Local::now().date_naive())?;
    let rows = sheet.grid.to_rows();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in rows {
            println!("{}", row.join("\t"));
        }
    }
    Ok(())
}

pub fn names() -> CliResult {
    let service = open_service(None)?;
    for name in service.sheet_names()? {
        println!("{name}");
    }
    Ok(())
}

pub fn run(action: SheetAction) -> CliResult {
    match action {
        SheetAction::Import { name, file } => {
            let content = std::fs::read_to_string(&file)?;
            let rows: Vec<Vec<String>> = serde_json::from_str(&content)?;
            let mut service = open_service(None)?;
            let sheet = service.import_sheet(&name, rows)?;
            println!(
                "imported {} ({} rows, {} columns)",
                sheet.name,
                sheet.grid.height(),
                sheet.grid.width()
            );
        }
    }
    Ok(())
}

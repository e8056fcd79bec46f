use clap::Subcommand;

use super::{open_service, CliResult};

#[derive(Subcommand)]
pub enum MemberAction {
    /// Overwrite a member's marks, starting at the first value column
    Update {
        /// Sheet name (YYYYMM)
        sheet: String,
        /// Member name as written in the first column
        member: String,
        /// Cell values in column order (use "" to clear)
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },
}

pub fn run(action: MemberAction) -> CliResult {
    match action {
        MemberAction::Update {
            sheet,
            member,
            values,
        } => {
            let mut service = open_service(None)?;
            service.update_member_row(&sheet, &member, values.as_slice())?;
            println!("updated {member} in {sheet}");
        }
    }
    Ok(())
}

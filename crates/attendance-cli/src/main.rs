use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "attendance-cli", version, about = "Practice attendance roll CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a month sheet with the calendar
    Sync(commands::sync::SyncArgs),
    /// Print a sheet (default: current month)
    List(commands::sheet::ListArgs),
    /// List month sheets
    Sheets,
    /// Sheet management
    Sheet {
        #[command(subcommand)]
        action: commands::sheet::SheetAction,
    },
    /// Member row management
    Member {
        #[command(subcommand)]
        action: commands::member::MemberAction,
    },
    /// Send notification mail
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Inspect queued mail
    Outbox {
        #[command(subcommand)]
        action: commands::outbox::OutboxAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Credential management for the calendar and mail relay
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(args),
        Commands::List(args) => commands::sheet::list(args),
        Commands::Sheets => commands::sheet::names(),
        Commands::Sheet { action } => commands::sheet::run(action),
        Commands::Member { action } => commands::member::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Outbox { action } => commands::outbox::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};

use grants_retrieval::Settings;

/// Web of Science Grants Index retrieval and reporting
#[derive(Parser, Debug)]
#[command(name = "grants-retrieval", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count the records a query matches
    Validate {
        /// Advanced search query, e.g. TS=(soil microbiome)
        query: String,
    },
    /// Collect every matching grant, export it and print the report series
    Run {
        query: String,
        /// Also write the report series as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Rebuild the report series from a previously exported file
    Report { file: PathBuf },
    /// Show the USD rate table, refreshing it when stale
    Rates {
        /// Refresh even if the cached table is current
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();
    let settings = Settings::load()?;
    info!("Starting grants retrieval ({:?})", cli.command);

    match cli.command {
        Command::Validate { query } => handlers::validate(&settings, &query).await,
        Command::Run { query, report } => handlers::run(&settings, &query, report.as_deref()).await,
        Command::Report { file } => handlers::report(&file),
        Command::Rates { refresh } => handlers::rates(&settings, refresh).await,
    }
}

mod handlers;

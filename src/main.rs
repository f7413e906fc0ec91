//! Rendez CLI entry point.

use clap::{Parser, Subcommand};
use rendez::Config;
use tracing_subscriber::EnvFilter;

mod cli;

/// Rendez: appointment slot generation and booking
#[derive(Parser, Debug)]
#[command(name = "rendez")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the bookable month grids for a scenario
    Slots {
        /// Path to the scenario file
        scenario: String,
        /// Viewer timezone (IANA name, e.g. "Europe/Brussels")
        #[arg(short, long)]
        timezone: Option<String>,
        /// Viewer locale code (e.g. "fr_FR")
        #[arg(short, long)]
        locale: Option<String>,
        /// Restrict to the given staff ids (repeatable)
        #[arg(short, long)]
        staff: Vec<String>,
        /// Evaluation instant as RFC 3339 (defaults to now)
        #[arg(short, long)]
        reference: Option<String>,
    },
    /// Book a slot, recording the commitment that blocks it
    Book {
        /// Path to the scenario file
        scenario: String,
        /// Staff id shown on the picked slot
        #[arg(long)]
        staff: String,
        /// Slot start as RFC 3339 UTC
        #[arg(long)]
        start: String,
        /// Slot end as RFC 3339 UTC
        #[arg(long)]
        end: String,
        /// Requester name
        #[arg(short, long)]
        name: String,
        /// Requester email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Validate a scenario's appointment configuration
    Validate {
        /// Path to the scenario file
        scenario: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Minimal logging unless RUST_LOG asks for more
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    match args.command {
        Command::Slots {
            scenario,
            timezone,
            locale,
            staff,
            reference,
        } => {
            cli::run_slots(config, scenario, timezone, locale, staff, reference, args.json).await
        }
        Command::Book {
            scenario,
            staff,
            start,
            end,
            name,
            email,
        } => cli::run_book(config, scenario, staff, start, end, name, email, args.json).await,
        Command::Validate { scenario } => cli::run_validate(scenario, args.json).await,
    }
}

//! geopin-sim: replay scripted location picker sessions.
//!
//! Prints the host message stream as JSON lines on stdout; banners, logs and
//! the final summary go to stderr.

use clap::{ArgAction, Parser, Subcommand};
use geopin_telemetry::TelemetryConfig;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod fixtures;
mod scenario;

/// Location picker session simulator
#[derive(Parser)]
#[command(name = "geopin-sim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file
    Run {
        /// Path to the scenario JSON
        scenario: PathBuf,

        /// Pretty-print each message
        #[arg(long)]
        pretty: bool,
    },

    /// Great-circle distance between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        lat1: f64,
        lng1: f64,
        lat2: f64,
        lng2: f64,

        /// Fence radius in meters around the first point
        #[arg(short, long)]
        radius: Option<f64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = geopin_telemetry::init_with_config(TelemetryConfig::with_verbosity(cli.verbose))
    {
        eprintln!("{} {}", "warning:".yellow(), e);
    }

    let result = match cli.command {
        Commands::Run { scenario, pretty } => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(anyhow::Error::from)
            .and_then(|rt| rt.block_on(commands::run::run(&scenario, pretty, &cli.format)))
            .map(|_| ()),
        Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
            radius,
        } => commands::distance::run((lat1, lng1), (lat2, lng2), radius, &cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

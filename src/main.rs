//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ip_location_updater` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use sqlx::Connection;

use ip_location_updater::config::DEFAULT_SCHEDULE_AT;
use ip_location_updater::initialization::init_logger_with;
use ip_location_updater::{
    acquire_connection, lookup_ip, parse_target_time, run_update, Config, LogFormat, LogLevel,
    TriggerOutcome, UpdateReport, UpdateScheduler,
};

#[derive(Debug, Parser)]
#[command(
    name = "ip_location_updater",
    version,
    about = "Keeps a local SQLite copy of a public IP geolocation dataset up to date"
)]
struct Cli {
    /// Logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Logging format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    /// SQLite database path (overrides IP_LOCATIONS_DB_PATH)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Dataset URL (overrides IP_LOCATIONS_DATASET_URL)
    #[arg(long)]
    dataset_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one update and exit (the default)
    Update,
    /// Run updates daily at a fixed UTC time, until killed
    Schedule {
        /// Daily update time, HH:MM (24-hour, UTC)
        #[arg(long, default_value = DEFAULT_SCHEDULE_AT, value_parser = parse_target_time)]
        at: NaiveTime,
    },
    /// Trigger one update through the scheduler gate and exit; failures are
    /// logged and the exit code stays 0
    RunNow,
    /// Look up an address in the canonical table and print JSON
    Lookup {
        /// Address to look up (IPv4 or IPv6)
        ip: IpAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = cli.log_level.clone();
    let log_format = cli.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let mut config = Config::from_env();
    config.log_level = cli.log_level;
    config.log_format = cli.log_format;
    if let Some(path) = cli.db_path {
        config.db_path = path;
    }
    if let Some(url) = cli.dataset_url {
        config.dataset_url = url;
    }

    match cli.command.unwrap_or(Command::Update) {
        Command::Update => run_once(config).await,
        Command::Schedule { at } => {
            UpdateScheduler::new(config).run_daily(at).await;
            Ok(())
        }
        Command::RunNow => run_now(config).await,
        Command::Lookup { ip } => lookup(config, ip).await,
    }
}

async fn run_once(config: Config) -> Result<()> {
    match run_update(&config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            eprintln!("ip_location_updater error: {}", e);
            process::exit(1);
        }
    }
}

async fn run_now(config: Config) -> Result<()> {
    let scheduler = UpdateScheduler::new(config);
    match scheduler.trigger_update().await {
        TriggerOutcome::Completed(report) => print_report(&report),
        TriggerOutcome::Skipped => {
            println!("⚠️ An update is already in progress; nothing to do")
        }
        // Already logged at the scheduler boundary; a manual trigger exits 0
        // whether or not the run succeeded, like a scheduled run that fails
        // in place
        TriggerOutcome::Failed(e) => eprintln!("ip_location_updater error: {}", e),
    }
    Ok(())
}

async fn lookup(config: Config, ip: IpAddr) -> Result<()> {
    let mut conn = acquire_connection(&config)
        .await
        .context("Failed to open storage")?;
    let found = lookup_ip(&mut conn, ip).await.context("Lookup failed")?;
    if let Err(e) = conn.close().await {
        log::warn!("Closing storage connection failed: {}", e);
    }

    match found {
        Some(location) => println!("{}", location.to_json(ip)),
        None => println!(
            "{}",
            serde_json::json!({ "error": "IP address location not found" })
        ),
    }
    Ok(())
}

fn print_report(report: &UpdateReport) {
    // Print user-friendly summary
    println!(
        "✅ Loaded {} row{} in {:.1}s{}",
        report.rows_loaded,
        if report.rows_loaded == 1 { "" } else { "s" },
        report.elapsed_seconds,
        if report.bootstrap { " (first load)" } else { "" }
    );
    println!("Dataset live in {}", report.db_path.display());
}

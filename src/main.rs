//! # Main: CLI Entry Point
//!
//! Routes subcommands to the calculator, planner and verification engine.
//! Handles the shared concerns: `.env` loading, logging setup, the settings
//! file and the catalog location.
//!
//! ## Subcommands
//!
//! - `verify`: check the catalog against reference values and update the
//!   verification record. Exits non-zero when any check fails.
//! - `status`: show when the catalog was last verified and the changelog.
//! - `quote`: price one item for a quality, profession set and processing.
//! - `rank`: rank crops for a season by best gold-per-day.
//!
//! ## Global Options
//!
//! - `--catalog` / `CROPWISE_CATALOG`: catalog JSON (bundled when unset).
//! - `--record` / `CROPWISE_RECORD`: verification record JSON.
//! - `--config` / `CROPWISE_CONFIG`: settings TOML (`cropwise.toml` if present).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cropwise::catalog::{ProcessingChoice, Season};
use cropwise::modifiers::QualityTier;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cropwise",
    version,
    about = "Price, rank and verify farm produce data"
)]
struct Cli {
    /// Catalog JSON file (defaults to the bundled catalog)
    #[arg(long, global = true, env = "CROPWISE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Verification record JSON file (default: verification.json)
    #[arg(long, global = true, env = "CROPWISE_RECORD")]
    record: Option<PathBuf>,

    /// Settings TOML file (default: cropwise.toml when present)
    #[arg(long, global = true, env = "CROPWISE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the catalog against known reference values
    Verify,
    /// Show verification freshness and the recent changelog
    Status,
    /// Quote the effective price and gold-per-day of one item
    Quote {
        /// Item id, e.g. "strawberry"
        #[arg(long)]
        item: String,
        /// Quality tier: normal, silver, gold, iridium
        #[arg(long)]
        quality: Option<QualityTier>,
        /// Active profession id (repeatable)
        #[arg(long = "profession")]
        professions: Vec<String>,
        /// Processing: raw, jar, keg (default raw)
        #[arg(long)]
        processing: Option<ProcessingChoice>,
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rank crops by best-strategy gold-per-day
    Rank {
        /// Only crops growing in this season
        #[arg(long)]
        season: Option<Season>,
        /// Quality tier: normal, silver, gold, iridium
        #[arg(long)]
        quality: Option<QualityTier>,
        /// Active profession id (repeatable)
        #[arg(long = "profession")]
        professions: Vec<String>,
        /// Fertilizer id applied to every crop
        #[arg(long)]
        fertilizer: Option<String>,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for machine-readable logs, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let ctx = cli::Context::load(&cli)?;

    match &cli.command {
        Commands::Verify => cli::run_verify(&ctx),
        Commands::Status => cli::run_status(&ctx),
        Commands::Quote {
            item,
            quality,
            professions,
            processing,
            json,
        } => cli::run_quote(&ctx, item, *quality, professions, *processing, *json),
        Commands::Rank {
            season,
            quality,
            professions,
            fertilizer,
            limit,
        } => cli::run_rank(
            &ctx,
            *season,
            *quality,
            professions,
            fertilizer.as_deref(),
            *limit,
        ),
    }
}

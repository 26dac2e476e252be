//! ETL Loader (Rust)
//!
//! Responsibilities:
//! - Ensure the relational schema exists
//! - Read the scraped player and match CSV feeds
//! - Normalize both tables and load them in one transaction
//! - Report what was dropped, what was loaded, and final row counts

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use pitchstats_core::db::DEFAULT_DATABASE_URL;
use pitchstats_core::{run_pipeline_from_paths, LoadConfig, NormalizeConfig, PipelineReport, Store, StoreConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load one season of scraped football data into the store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Player season CSV produced by the scraper
    #[arg(long, env = "PLAYERS_CSV")]
    players: PathBuf,

    /// Match list CSV produced by the scraper
    #[arg(long, env = "MATCHES_CSV")]
    matches: PathBuf,

    /// Store location
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    info!("Starting ETL loader...");

    // Config
    let normalize_config = NormalizeConfig::from_env().context("Invalid normalization policy")?;
    let load_config = LoadConfig::from_env();
    let store_config = StoreConfig::from_env();
    info!(
        "Config: competition_filter='{}', card_policy={}, goal_policy={}, season='{}'",
        normalize_config.competition_filter,
        normalize_config.card_policy.as_str(),
        normalize_config.goal_policy.as_str(),
        load_config.season_label
    );

    let store = Store::connect(&cli.database_url, &store_config)
        .await
        .with_context(|| format!("Failed to open store at {}", cli.database_url))?;

    let outcome = run_pipeline_from_paths(
        &store,
        &cli.players,
        &cli.matches,
        &normalize_config,
        &load_config,
    )
    .await
    .with_context(|| {
        format!(
            "ETL run failed for {} and {}",
            cli.players.display(),
            cli.matches.display()
        )
    });

    store.close().await;
    let report = outcome?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    info!("ETL loader finished");
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!(
        "Players: {} of {} rows kept (dropped: {})",
        report.players.kept, report.players.input_rows, report.players.dropped
    );
    println!(
        "Matches: {} of {} rows kept (dropped: {})",
        report.matches.kept, report.matches.input_rows, report.matches.dropped
    );

    let diagnostics = report.players.diagnostics.iter().chain(&report.matches.diagnostics);
    for diagnostic in diagnostics {
        println!(
            "  row {} column {}: {} ({:?}), policy {}",
            diagnostic.row,
            diagnostic.column,
            diagnostic.problem.describe(),
            diagnostic.raw.as_deref().unwrap_or(""),
            diagnostic.policy.as_str()
        );
    }

    println!("Loaded:");
    println!("  teams          {}", report.load.teams);
    println!("  players        {}", report.load.players);
    println!("  player stats   {}", report.load.player_stats);
    println!("  matches        {}", report.load.matches);
    println!("  match results  {}", report.load.match_results);
    println!("Store: {}", report.counts);
}

//! Dashboard Query (Rust)
//!
//! Responsibilities:
//! - List the query catalog and the teams available for filtering
//! - Run one template with an optional team filter
//! - Print the result as a table or JSON, with its chart hint
//! - Export the exact result set as CSV

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pitchstats_core::db::{check_store_health, table_counts, DEFAULT_DATABASE_URL};
use pitchstats_core::{QueryEngine, QueryTemplate, Store, StoreConfig, TabularResult};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Query the loaded football season
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store location
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every query template
    Templates,
    /// List team names usable as a filter
    Teams,
    /// Show row counts of every table
    Counts,
    /// Run one query template
    Run {
        /// Template display name or slug
        template: String,

        /// Restrict the result to one team
        #[arg(long)]
        team: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Also write the result to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Command::Templates = cli.command {
        print_templates();
        return Ok(());
    }

    let store = Store::connect(&cli.database_url, &StoreConfig::from_env())
        .await
        .with_context(|| format!("Failed to open store at {}", cli.database_url))?;
    check_store_health(&store).await.context("Store health check failed")?;

    let outcome = execute(&store, cli.command).await;
    store.close().await;
    outcome
}

async fn execute(store: &Store, command: Command) -> Result<()> {
    match command {
        Command::Templates => print_templates(),
        Command::Teams => {
            for team in store.team_names().await.context("Failed to list teams")? {
                println!("{}", team);
            }
        }
        Command::Counts => {
            let counts = table_counts(store).await.context("Failed to count rows")?;
            println!("{}", counts);
        }
        Command::Run {
            template,
            team,
            json,
            csv,
        } => {
            let engine = QueryEngine::new(store.clone());
            let result = engine
                .run_named(&template, team.as_deref())
                .await
                .with_context(|| format!("Query '{}' failed", template))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_table(&result);
            }

            if let Some(path) = csv {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                result.write_csv(file)?;
                info!("Wrote {} rows to {}", result.len(), path.display());
            }
        }
    }
    Ok(())
}

fn print_templates() {
    for template in QueryTemplate::ALL {
        println!("{:<24} {:<28} {}", template.slug(), template.name(), template.description());
    }
}

fn print_table(result: &TabularResult) {
    let header = match &result.team {
        Some(team) => format!("{} ({})", result.template, team),
        None => result.template.to_string(),
    };
    println!("{}", header);

    if result.is_empty() {
        println!("(no rows)");
        return;
    }

    let rendered: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            rendered
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(&result.columns));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ")
    );
    for row in &rendered {
        println!("{}", line(row));
    }

    if let Some(chart) = &result.chart {
        println!();
        println!("Chart: {:?} '{}' x={} y={}", chart.kind, chart.title, chart.x, chart.y.join(","));
    }
}

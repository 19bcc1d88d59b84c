//! Carequote - health-insurance premium estimates
//! Entry point for the `carequote` binary.

mod cli;
mod commands;
mod format;

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carequote_config::Config;

use crate::cli::{Cli, Commands};

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.filter))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    info!("Carequote {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Predict { input, json } => {
            let attrs = commands::parse_record(&commands::read_input(&input)?)?;
            let predictor = commands::load_predictor(&config);
            println!("{}", commands::predict(&predictor, &attrs, json)?);
        }
        Commands::Batch { input, json } => {
            let records = commands::parse_records(&commands::read_input(&input)?)?;
            info!("Scoring {} records", records.len());
            let predictor = Arc::new(commands::load_predictor(&config));
            let results = commands::score_batch(predictor, records).await;
            for line in commands::render_batch(&results, json)? {
                println!("{line}");
            }
        }
        Commands::Options => {
            for line in commands::options() {
                println!("{line}");
            }
        }
    }

    Ok(())
}

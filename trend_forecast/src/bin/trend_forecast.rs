//! Trend forecast CLI
//!
//! Reads a historical price table, estimates the EMA trend and volatility,
//! projects a random-walk continuation to the end date and writes the combined
//! table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trend_forecast::config::{ConfigOverrides, ForecastConfig};
use trend_forecast::forecast::{NegativePricePolicy, RngNormalSource};
use trend_forecast::pipeline;
use trend_forecast::utils::date_parser;

#[derive(Parser)]
#[command(name = "trend_forecast", version)]
#[command(about = "Project an EMA price trend to a future date", long_about = None)]
struct Cli {
    /// Historical price table (.csv or .xlsx) with Date and Price columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output table (.csv or .xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Last forecast day, YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS UTC"
    #[arg(short, long, value_parser = parse_end_date)]
    end_date: Option<DateTime<Utc>>,

    /// EMA span
    #[arg(long)]
    span: Option<usize>,

    /// Seed for reproducible forecasts
    #[arg(long)]
    seed: Option<u64>,

    /// Handling of non-positive synthetic prices (allow, floor, reject)
    #[arg(long)]
    negative_prices: Option<NegativePricePolicy>,

    /// JSON configuration file; flags take precedence over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_end_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    date_parser::parse_date(raw).map_err(|e| e.to_string())
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let overrides = ConfigOverrides {
        input: cli.input,
        output: cli.output,
        end_date: cli.end_date,
        span: cli.span,
        seed: cli.seed,
        negative_prices: cli.negative_prices,
    };
    let config = ForecastConfig::resolve(cli.config.as_deref(), overrides)
        .context("Invalid configuration")?;

    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        end_date = %date_parser::format_utc(&config.end_date),
        span = config.span,
        "starting forecast"
    );

    let summary = match config.seed {
        Some(seed) => pipeline::run(&config, &mut RngNormalSource::seeded(seed)),
        None => pipeline::run(&config, &mut RngNormalSource::from_entropy()),
    }
    .with_context(|| format!("Forecast from '{}' failed", config.input.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }

    Ok(())
}

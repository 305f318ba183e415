//! End-to-end run: load, estimate, forecast, write

use crate::config::ForecastConfig;
use crate::data::CombinedSeries;
use crate::error::Result;
use crate::forecast::{ForecastGenerator, NormalSource};
use crate::io;
use crate::trend::TrendEstimator;
use crate::utils::date_parser::{self, serde_utc};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub historical_rows: usize,
    pub forecast_rows: usize,
    /// Daily standard deviation of historical price changes
    pub volatility: f64,
    pub last_ema: f64,
    #[serde(with = "serde_utc")]
    pub end_date: DateTime<Utc>,
    pub output: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Forecast generated up to {}",
            date_parser::format_utc(&self.end_date)
        )?;
        writeln!(f, "Results saved to '{}'", self.output.display())?;
        write!(
            f,
            "Daily standard deviation of price changes: {:.4}",
            self.volatility
        )
    }
}

/// Build the combined historical and forecast series without writing it
pub fn build_series<N>(config: &ForecastConfig, normals: &mut N) -> Result<(CombinedSeries, f64)>
where
    N: NormalSource + ?Sized,
{
    config.validate()?;

    let history = io::load_prices(&config.input)?;
    let estimate = TrendEstimator::new(config.span)?.estimate(&history)?;
    let anchor = estimate.anchor()?;
    info!(
        last_date = %date_parser::format_utc(&anchor.last_date()),
        last_ema = anchor.last_ema(),
        volatility = anchor.volatility(),
        "trend estimated"
    );

    let forecast = ForecastGenerator::new(config.negative_prices).generate(
        &anchor,
        config.end_date,
        normals,
    )?;

    let series = CombinedSeries::new(estimate.into_rows(), forecast)?;
    Ok((series, anchor.volatility()))
}

/// Run the whole forecast and persist the combined table to `config.output`
pub fn run<N>(config: &ForecastConfig, normals: &mut N) -> Result<RunSummary>
where
    N: NormalSource + ?Sized,
{
    let (series, volatility) = build_series(config, normals)?;
    io::write_series(&config.output, &series)?;

    let last_ema = series
        .historical()
        .last()
        .map(|row| row.ema)
        .unwrap_or_default();

    Ok(RunSummary {
        historical_rows: series.historical().len(),
        forecast_rows: series.forecast().len(),
        volatility,
        last_ema,
        end_date: config.end_date,
        output: config.output.clone(),
    })
}

//! Price series data for trend estimation and forecasting

use crate::error::{ForecastError, Result};
use crate::utils::date_parser::{self, serde_utc};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation time (UTC, second precision)
    #[serde(with = "serde_utc")]
    pub timestamp: DateTime<Utc>,
    /// Observed price
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Validated historical prices, sorted by ascending timestamp
#[derive(Debug, Clone)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Sort the points by timestamp and validate them
    ///
    /// Rejects an empty series, non-finite or non-positive prices and
    /// duplicate timestamps.
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::DataError(
                "Price history is empty".to_string(),
            ));
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !p.price.is_finite() || p.price <= 0.0)
        {
            return Err(ForecastError::DataError(format!(
                "Price at {} must be a positive number, got {}",
                date_parser::format_utc(&bad.timestamp),
                bad.price
            )));
        }

        points.sort_by_key(|p| p.timestamp);

        if let Some(pair) = points
            .windows(2)
            .find(|w| w[0].timestamp == w[1].timestamp)
        {
            return Err(ForecastError::DataError(format!(
                "Duplicate timestamp {}",
                date_parser::format_utc(&pair[0].timestamp)
            )));
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Prices in timestamp order
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Most recent observation
    pub fn last(&self) -> &PricePoint {
        // Non-empty by construction
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One row of the output table: `Date, Price, EMA, Price_Change`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    #[serde(with = "serde_utc")]
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub ema: f64,
    /// Fractional change from the previous row, undefined for the first row
    pub price_change: Option<f64>,
}

/// Synthetic forecast row; same shape as a historical row
pub type ForecastPoint = SeriesRow;

/// Historical rows followed by forecast rows
#[derive(Debug, Clone)]
pub struct CombinedSeries {
    rows: Vec<SeriesRow>,
    historical_len: usize,
}

impl CombinedSeries {
    /// Concatenate historical and forecast rows
    ///
    /// Timestamps must be strictly increasing across the whole series.
    pub fn new(historical: Vec<SeriesRow>, forecast: Vec<ForecastPoint>) -> Result<Self> {
        let historical_len = historical.len();
        let mut rows = historical;
        rows.extend(forecast);

        if let Some(pair) = rows
            .windows(2)
            .find(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(ForecastError::DataError(format!(
                "Combined series is not strictly increasing at {} -> {}",
                date_parser::format_utc(&pair[0].timestamp),
                date_parser::format_utc(&pair[1].timestamp)
            )));
        }

        Ok(Self {
            rows,
            historical_len,
        })
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn historical(&self) -> &[SeriesRow] {
        &self.rows[..self.historical_len]
    }

    pub fn forecast(&self) -> &[ForecastPoint] {
        &self.rows[self.historical_len..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Trend estimation: EMA series and daily return volatility

use crate::data::{PriceHistory, SeriesRow};
use crate::error::{ForecastError, Result};
use crate::forecast::ForecastAnchor;
use tracing::debug;
use trade_math::{ema_series, pct_change, return_volatility, smoothing_factor};

/// Default EMA span in observations
pub const DEFAULT_SPAN: usize = 30;

/// Computes the EMA series and volatility estimate of a price history
#[derive(Debug, Clone, Copy)]
pub struct TrendEstimator {
    span: usize,
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self { span: DEFAULT_SPAN }
    }
}

impl TrendEstimator {
    /// Create an estimator with the given EMA span
    pub fn new(span: usize) -> Result<Self> {
        if span == 0 {
            return Err(ForecastError::InvalidParameter(
                "EMA span must be greater than zero".to_string(),
            ));
        }

        Ok(Self { span })
    }

    pub fn span(&self) -> usize {
        self.span
    }

    /// Smoothing factor `2 / (span + 1)`
    pub fn alpha(&self) -> f64 {
        smoothing_factor(self.span)
    }

    /// Annotate the history with EMA and price change, and estimate volatility
    ///
    /// Needs at least two observations.
    pub fn estimate(&self, history: &PriceHistory) -> Result<TrendEstimate> {
        if history.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Trend estimation needs at least 2 prices, have {}",
                history.len()
            )));
        }

        let prices = history.prices();
        let ema = ema_series(&prices, self.span)?;
        let changes = pct_change(&prices);
        let volatility = return_volatility(&prices)?;

        let rows = history
            .points()
            .iter()
            .zip(ema)
            .zip(changes)
            .map(|((point, ema), price_change)| SeriesRow {
                timestamp: point.timestamp,
                price: point.price,
                ema,
                price_change,
            })
            .collect();

        debug!(
            span = self.span,
            alpha = self.alpha(),
            points = history.len(),
            volatility,
            "estimated trend"
        );

        Ok(TrendEstimate { rows, volatility })
    }
}

/// Output of [`TrendEstimator::estimate`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrendEstimate {
    rows: Vec<SeriesRow>,
    volatility: f64,
}

impl TrendEstimate {
    /// Historical rows with `ema` and `price_change` populated
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    /// Sample standard deviation of the historical daily returns
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn last_row(&self) -> &SeriesRow {
        // At least two rows by construction
        &self.rows[self.rows.len() - 1]
    }

    /// Anchor values for the forecast generator
    pub fn anchor(&self) -> Result<ForecastAnchor> {
        let last = self.last_row();
        ForecastAnchor::new(last.timestamp, last.ema, last.price, self.volatility)
    }

    pub fn into_rows(self) -> Vec<SeriesRow> {
        self.rows
    }
}

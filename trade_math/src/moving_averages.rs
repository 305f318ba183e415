//! Exponential moving average
//!
//! The EMA here follows the "adjust=false" convention: the first observation
//! seeds the average directly, with no warm-up window and no bias correction.

use crate::{MathError, Result};

/// Streaming Exponential Moving Average (EMA)
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    span: usize,
    alpha: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create a new EMA for the given span, with `alpha = 2 / (span + 1)`
    pub fn new(span: usize) -> Result<Self> {
        if span == 0 {
            return Err(MathError::InvalidInput(
                "Span must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            span,
            alpha: smoothing_factor(span),
            current_ema: None,
        })
    }

    /// Feed the next observation and return the updated EMA
    pub fn update(&mut self, value: f64) -> f64 {
        let next = match self.current_ema {
            None => value,
            // Same as alpha * value + (1 - alpha) * prev, but exact for a flat series
            Some(prev) => prev + self.alpha * (value - prev),
        };
        self.current_ema = Some(next);
        next
    }

    /// Get the current EMA value
    pub fn value(&self) -> Result<f64> {
        self.current_ema.ok_or_else(|| {
            MathError::InsufficientData("EMA has not seen any values yet".to_string())
        })
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn span(&self) -> usize {
        self.span
    }

    /// Reset the EMA, forgetting every observation
    pub fn reset(&mut self) {
        self.current_ema = None;
    }
}

/// Smoothing factor `2 / (span + 1)` for a span-parameterised EMA
pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA over a whole series, aligned index-for-index with `values`
pub fn ema_series(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span)?;
    Ok(values.iter().map(|&value| ema.update(value)).collect())
}

//! # Trade Math
//!
//! Numeric kernels for trend estimation on price series: the exponential
//! moving average, percentage returns and return volatility.

use thiserror::Error;

pub mod moving_averages;
pub mod returns;
pub mod volatility;

pub use moving_averages::{ema_series, smoothing_factor, ExponentialMovingAverage};
pub use returns::{pct_change, relative_change};
pub use volatility::{return_volatility, sample_std_dev};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

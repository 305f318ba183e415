//! Volatility estimates over return series

use crate::returns::pct_change;
use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Sample (Bessel-corrected) standard deviation
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Sample standard deviation needs at least 2 values, have {}",
            values.len()
        )));
    }

    let std_dev = values.std_dev();
    if !std_dev.is_finite() {
        return Err(MathError::CalculationError(
            "Standard deviation is not finite".to_string(),
        ));
    }

    Ok(std_dev)
}

/// Daily return volatility of a price series
///
/// Standard deviation of the percentage changes, skipping undefined entries.
/// A single defined return has no spread, so the estimate is `0.0`.
pub fn return_volatility(prices: &[f64]) -> Result<f64> {
    if prices.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Volatility needs at least 2 prices, have {}",
            prices.len()
        )));
    }

    let returns: Vec<f64> = pct_change(prices).into_iter().flatten().collect();
    match returns.len() {
        0 => Err(MathError::InsufficientData(
            "No defined returns in price series".to_string(),
        )),
        1 => Ok(0.0),
        _ => sample_std_dev(&returns),
    }
}

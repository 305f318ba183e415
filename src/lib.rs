//! # Trend Forecast Workspace
//!
//! Umbrella crate re-exporting the workspace members:
//!
//! - [`trade_math`]: EMA, percentage changes and sample volatility
//! - [`trend_forecast`]: price tables, trend estimation and the random-walk forecast
//!
//! ## Example
//!
//! ```
//! use trend_forecast_workspace::trade_math::ema_series;
//!
//! let ema = ema_series(&[10.0, 20.0], 3).unwrap();
//! assert_eq!(ema, vec![10.0, 15.0]);
//! ```

pub use trade_math;
pub use trend_forecast;

pub use trend_forecast::{ForecastConfig, ForecastError, RunSummary};

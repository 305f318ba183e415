//! # Trend Forecast
//!
//! Projects a single asset's price trend to a fixed future date.
//!
//! ## Features
//!
//! - Historical prices from `.csv` or `.xlsx` tables (`Date`, `Price` columns)
//! - EMA trend (`span` 30 by default, seeded by the first price)
//! - Daily volatility from the sample standard deviation of returns
//! - Random-walk continuation anchored on the last EMA, one row per day
//! - Styled `.xlsx` or plain `.csv` output, written atomically
//!
//! ## Quick Start
//!
//! ```no_run
//! use trend_forecast::config::ForecastConfig;
//! use trend_forecast::forecast::RngNormalSource;
//! use trend_forecast::pipeline;
//!
//! let config = ForecastConfig::new("prices.xlsx", "forecast.xlsx").with_seed(7);
//! let mut normals = RngNormalSource::seeded(7);
//!
//! let summary = pipeline::run(&config, &mut normals)?;
//! println!("{}", summary);
//! # Ok::<(), trend_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod io;
pub mod pipeline;
pub mod trend;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{CombinedSeries, ForecastPoint, PriceHistory, PricePoint, SeriesRow};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{
    FixedNormalSource, ForecastAnchor, ForecastGenerator, NegativePricePolicy, NormalSource,
    RngNormalSource,
};
pub use crate::pipeline::RunSummary;
pub use crate::trend::{TrendEstimate, TrendEstimator, DEFAULT_SPAN};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

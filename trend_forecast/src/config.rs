//! Run configuration
//!
//! Values come from three layers, highest priority first: explicit overrides
//! (command-line flags), an optional JSON file, and built-in defaults.

use crate::error::{ForecastError, Result};
use crate::forecast::NegativePricePolicy;
use crate::trend::DEFAULT_SPAN;
use crate::utils::date_parser::{self, serde_utc};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default forecast horizon end: 2025-09-06 00:00:00 UTC
pub fn default_end_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 6, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Fully resolved settings for one forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Historical price table (`.csv` or `.xlsx`)
    pub input: PathBuf,
    /// Destination of the combined table (`.csv` or `.xlsx`)
    pub output: PathBuf,
    /// Last day of the forecast horizon, inclusive
    #[serde(with = "serde_utc")]
    pub end_date: DateTime<Utc>,
    /// EMA span
    pub span: usize,
    /// Seed for reproducible draws; fresh entropy when absent
    pub seed: Option<u64>,
    pub negative_prices: NegativePricePolicy,
}

impl ForecastConfig {
    /// Settings with default horizon, span and policy
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            end_date: default_end_date(),
            span: DEFAULT_SPAN,
            seed: None,
            negative_prices: NegativePricePolicy::default(),
        }
    }

    /// Merge overrides, an optional config file and defaults, then validate
    pub fn resolve(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let from_file = match file {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let input = overrides
            .input
            .or(from_file.input)
            .ok_or_else(|| ForecastError::ConfigError("No input path given".to_string()))?;
        let output = overrides
            .output
            .or(from_file.output)
            .ok_or_else(|| ForecastError::ConfigError("No output path given".to_string()))?;

        let config = Self {
            input,
            output,
            end_date: overrides
                .end_date
                .or(from_file.end_date)
                .unwrap_or_else(default_end_date),
            span: overrides.span.or(from_file.span).unwrap_or(DEFAULT_SPAN),
            seed: overrides.seed.or(from_file.seed),
            negative_prices: overrides
                .negative_prices
                .or(from_file.negative_prices)
                .unwrap_or_default(),
        };

        config.validate()?;
        debug!(?config, "resolved configuration");
        Ok(config)
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_negative_prices(mut self, policy: NegativePricePolicy) -> Self {
        self.negative_prices = policy;
        self
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.span == 0 {
            return Err(ForecastError::ConfigError(
                "span must be greater than zero".to_string(),
            ));
        }
        if self.input.as_os_str().is_empty() || self.output.as_os_str().is_empty() {
            return Err(ForecastError::ConfigError(
                "input and output paths must not be empty".to_string(),
            ));
        }
        if self.input == self.output {
            return Err(ForecastError::ConfigError(format!(
                "output '{}' would overwrite the input",
                self.output.display()
            )));
        }
        Ok(())
    }
}

/// Contents of a JSON configuration file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(deserialize_with = "optional_date")]
    pub end_date: Option<DateTime<Utc>>,
    pub span: Option<usize>,
    pub seed: Option<u64>,
    pub negative_prices: Option<NegativePricePolicy>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| {
            ForecastError::ConfigError(format!("{}: {}", path.display(), e))
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn optional_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => date_parser::parse_date(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Settings given explicitly, e.g. on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub end_date: Option<DateTime<Utc>>,
    pub span: Option<usize>,
    pub seed: Option<u64>,
    pub negative_prices: Option<NegativePricePolicy>,
}

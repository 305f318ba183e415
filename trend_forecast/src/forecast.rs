//! Random-walk projection of the trend to a target date
//!
//! Each forecast day multiplies a running factor by `(1 + ε)`, where `ε` is a
//! normal draw scaled by the historical daily volatility. The projected price is
//! the last historical EMA times that factor; the EMA column itself stays fixed
//! at the anchor value for every forecast row.

use crate::data::ForecastPoint;
use crate::error::{ForecastError, Result};
use crate::utils::{daily_range_after, date_parser};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};
use trade_math::relative_change;

/// Source of independent standard-normal draws
pub trait NormalSource {
    /// Next draw from N(0, 1)
    fn standard_normal(&mut self) -> f64;
}

/// Standard-normal draws from a `rand` generator
#[derive(Debug, Clone)]
pub struct RngNormalSource<R> {
    rng: R,
}

impl<R: Rng> RngNormalSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngNormalSource<StdRng> {
    /// Reproducible draws from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Fresh draws seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> NormalSource for RngNormalSource<R> {
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

/// Replays a fixed sequence of draws, cycling when it runs out
///
/// An empty sequence always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct FixedNormalSource {
    draws: Vec<f64>,
    next: usize,
}

impl FixedNormalSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, next: 0 }
    }

    /// Number of draws handed out so far
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl NormalSource for FixedNormalSource {
    fn standard_normal(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}

/// What to do when the random walk reaches a non-positive price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativePricePolicy {
    /// Keep the synthetic value as computed, even if negative
    #[default]
    Allow,
    /// Clamp at zero; the walk stays at zero from then on
    Floor,
    /// Abort the forecast with an error
    Reject,
}

impl fmt::Display for NegativePricePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegativePricePolicy::Allow => "allow",
            NegativePricePolicy::Floor => "floor",
            NegativePricePolicy::Reject => "reject",
        };
        f.write_str(name)
    }
}

impl FromStr for NegativePricePolicy {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(NegativePricePolicy::Allow),
            "floor" | "clamp" => Ok(NegativePricePolicy::Floor),
            "reject" => Ok(NegativePricePolicy::Reject),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown negative price policy '{}', expected allow, floor or reject",
                other
            ))),
        }
    }
}

/// Last historical values the forecast is anchored on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastAnchor {
    last_date: DateTime<Utc>,
    last_ema: f64,
    last_price: f64,
    volatility: f64,
}

impl ForecastAnchor {
    pub fn new(
        last_date: DateTime<Utc>,
        last_ema: f64,
        last_price: f64,
        volatility: f64,
    ) -> Result<Self> {
        if !last_ema.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "Last EMA must be finite, got {}",
                last_ema
            )));
        }
        if !last_price.is_finite() || last_price <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Last price must be positive, got {}",
                last_price
            )));
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Volatility must be a non-negative number, got {}",
                volatility
            )));
        }

        Ok(Self {
            last_date,
            last_ema,
            last_price,
            volatility,
        })
    }

    pub fn last_date(&self) -> DateTime<Utc> {
        self.last_date
    }

    pub fn last_ema(&self) -> f64 {
        self.last_ema
    }

    pub fn last_price(&self) -> f64 {
        self.last_price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }
}

/// Generates the synthetic daily continuation of a trend
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastGenerator {
    policy: NegativePricePolicy,
}

impl ForecastGenerator {
    pub fn new(policy: NegativePricePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NegativePricePolicy {
        self.policy
    }

    /// Project one row per day from `anchor.last_date + 1 day` through `end_date`
    ///
    /// Returns an empty forecast when `end_date` is before the first forecast day.
    pub fn generate<N>(
        &self,
        anchor: &ForecastAnchor,
        end_date: DateTime<Utc>,
        normals: &mut N,
    ) -> Result<Vec<ForecastPoint>>
    where
        N: NormalSource + ?Sized,
    {
        let dates = daily_range_after(anchor.last_date, end_date);
        if dates.is_empty() {
            debug!(
                last_date = %date_parser::format_utc(&anchor.last_date),
                end_date = %date_parser::format_utc(&end_date),
                "forecast horizon is empty"
            );
            return Ok(Vec::new());
        }

        let shocks: Vec<f64> = (0..dates.len())
            .map(|_| anchor.volatility * normals.standard_normal())
            .collect();

        let mut rows = Vec::with_capacity(dates.len());
        let mut cumulative = 1.0;
        let mut previous_price = anchor.last_price;
        let mut warned = false;

        for (timestamp, shock) in dates.into_iter().zip(shocks) {
            cumulative *= 1.0 + shock;

            if cumulative <= 0.0 {
                match self.policy {
                    NegativePricePolicy::Allow => {
                        if !warned {
                            warn!(
                                date = %date_parser::format_utc(&timestamp),
                                "random walk produced a non-positive price"
                            );
                            warned = true;
                        }
                    }
                    NegativePricePolicy::Floor => cumulative = 0.0,
                    NegativePricePolicy::Reject => {
                        return Err(ForecastError::ForecastingError(format!(
                            "Synthetic price on {} is not positive",
                            date_parser::format_utc(&timestamp)
                        )));
                    }
                }
            }

            let price = anchor.last_ema * cumulative;
            rows.push(ForecastPoint {
                timestamp,
                price,
                ema: anchor.last_ema,
                price_change: relative_change(previous_price, price),
            });
            previous_price = price;
        }

        info!(
            days = rows.len(),
            volatility = anchor.volatility,
            policy = %self.policy,
            "generated forecast"
        );

        Ok(rows)
    }
}

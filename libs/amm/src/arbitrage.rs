//! Arbitrage flow that pulls pools back toward a target price
//!
//! Each pass sizes a corrective trade from the reserve surplus on the
//! overpriced side, scales it by a convergence factor and sends it through
//! the pool's own swap. Passes stop once the remaining gap is inside the
//! fee-derived no-arbitrage band.

use crate::error::AmmResult;
use crate::pool_traits::{MarketMakerModel, SwapDirection};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Multiple of the fee tier inside which no arbitrage is attempted
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 1.5;

/// Named arbitrage aggressiveness levels
///
/// Serializes as the strings "100", "87" and "50"; deserializes from those
/// strings, the equivalent integers, or the lowercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ArbitrageMode {
    /// Competitive bots: up to 10 passes closing 60% each
    #[serde(rename = "100")]
    Efficient,
    /// Three passes closing half the gap each (~87.5% total)
    #[default]
    #[serde(rename = "87")]
    Balanced,
    /// A single half-gap pass
    #[serde(rename = "50")]
    Passive,
}

impl ArbitrageMode {
    pub fn schedule(&self) -> ArbitrageSchedule {
        match self {
            ArbitrageMode::Efficient => ArbitrageSchedule::new(10, 0.6),
            ArbitrageMode::Balanced => ArbitrageSchedule::new(3, 0.5),
            ArbitrageMode::Passive => ArbitrageSchedule::new(1, 0.5),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArbitrageMode::Efficient => "100",
            ArbitrageMode::Balanced => "87",
            ArbitrageMode::Passive => "50",
        }
    }
}

impl fmt::Display for ArbitrageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArbitrageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "100" | "efficient" => Ok(ArbitrageMode::Efficient),
            "87" | "balanced" => Ok(ArbitrageMode::Balanced),
            "50" | "passive" => Ok(ArbitrageMode::Passive),
            other => Err(format!(
                "unknown arbitrage mode '{}', expected 100, 87 or 50",
                other
            )),
        }
    }
}

struct ArbitrageModeVisitor;

impl<'de> Visitor<'de> for ArbitrageModeVisitor {
    type Value = ArbitrageMode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an arbitrage mode: 100, 87 or 50")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        self.visit_str(&value.to_string())
    }
}

// Environment overrides arrive as integers once numeric parsing is on
impl<'de> Deserialize<'de> for ArbitrageMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ArbitrageModeVisitor)
    }
}

/// Pass budget and per-pass convergence factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageSchedule {
    pub max_passes: u32,
    pub convergence_factor: f64,
}

impl ArbitrageSchedule {
    pub fn new(max_passes: u32, convergence_factor: f64) -> Self {
        Self {
            max_passes,
            convergence_factor,
        }
    }
}

/// Why an arbitrage run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Remaining gap is inside the no-arbitrage band
    WithinThreshold,
    /// Sizing produced a non-positive trade
    NonPositiveSize,
    /// Pool returned zero output (e.g. halted)
    Rejected,
    /// Pass budget exhausted
    PassLimit,
}

/// Volume and fees generated by one arbitrage run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrageOutcome {
    /// Traded value in asset A units
    pub volume: f64,
    /// Fees charged on that volume
    pub fees: f64,
    pub passes: u32,
    pub stop_reason: StopReason,
}

/// Drives pools toward a target price with repeated corrective trades
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrageEngine {
    schedule: ArbitrageSchedule,
    threshold_multiplier: f64,
}

impl Default for ArbitrageEngine {
    fn default() -> Self {
        Self::from_mode(ArbitrageMode::default())
    }
}

impl ArbitrageEngine {
    pub fn new(schedule: ArbitrageSchedule, threshold_multiplier: f64) -> Self {
        Self {
            schedule,
            threshold_multiplier,
        }
    }

    pub fn from_mode(mode: ArbitrageMode) -> Self {
        Self::new(mode.schedule(), DEFAULT_THRESHOLD_MULTIPLIER)
    }

    pub fn schedule(&self) -> ArbitrageSchedule {
        self.schedule
    }

    /// Size the next corrective trade for `model`
    ///
    /// Returns `None` when the pool already sits inside the no-arbitrage band.
    pub fn size_trade(
        &self,
        model: &dyn MarketMakerModel,
        target_price: f64,
        fee_tier: f64,
    ) -> Option<(f64, SwapDirection)> {
        let reserves = model.reserves();
        let current_price = reserves.implied_price();
        let ratio = current_price / target_price;

        if (ratio - 1.0).abs() < fee_tier * self.threshold_multiplier {
            return None;
        }

        let factor = self.schedule.convergence_factor;
        if ratio > 1.0 {
            // Pool pays too much B per A: sell A into the pool
            let target_b = reserves.reserve_a * target_price;
            let surplus_b = reserves.reserve_b - target_b;
            Some((surplus_b / current_price * factor, SwapDirection::AToB))
        } else {
            // A is cheap in the pool: buy it with B
            let target_a = reserves.reserve_b / target_price;
            let surplus_a = reserves.reserve_a - target_a;
            Some((surplus_a * current_price * factor, SwapDirection::BToA))
        }
    }

    /// Run up to `max_passes` corrective trades against `model`
    pub fn run(
        &self,
        model: &mut dyn MarketMakerModel,
        target_price: f64,
        fee_tier: f64,
    ) -> AmmResult<ArbitrageOutcome> {
        let mut outcome = ArbitrageOutcome {
            volume: 0.0,
            fees: 0.0,
            passes: 0,
            stop_reason: StopReason::PassLimit,
        };

        for _ in 0..self.schedule.max_passes {
            let Some((amount_in, direction)) = self.size_trade(&*model, target_price, fee_tier)
            else {
                outcome.stop_reason = StopReason::WithinThreshold;
                break;
            };

            if amount_in <= 0.0 {
                outcome.stop_reason = StopReason::NonPositiveSize;
                break;
            }

            let amount_out = model.swap(amount_in, direction)?;
            if amount_out == 0.0 {
                outcome.stop_reason = StopReason::Rejected;
                break;
            }

            let trade_value = model.trade_value(amount_in, direction, target_price);
            outcome.volume += trade_value;
            outcome.fees += trade_value * fee_tier;
            outcome.passes += 1;

            debug!(
                pool = model.name(),
                pass = outcome.passes,
                ?direction,
                amount_in,
                amount_out,
                implied_price = model.implied_price(),
                target_price,
                "Arbitrage pass executed"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool_traits::Reserves;
    use crate::pools::{ConstantProductPool, StableSwapPool};

    fn deviation(model: &dyn MarketMakerModel, target: f64) -> f64 {
        (model.implied_price() / target - 1.0).abs()
    }

    #[test]
    fn test_mode_schedules() {
        assert_eq!(ArbitrageMode::Efficient.schedule(), ArbitrageSchedule::new(10, 0.6));
        assert_eq!(ArbitrageMode::Balanced.schedule(), ArbitrageSchedule::new(3, 0.5));
        assert_eq!(ArbitrageMode::Passive.schedule(), ArbitrageSchedule::new(1, 0.5));
        assert_eq!(ArbitrageMode::default(), ArbitrageMode::Balanced);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("100".parse::<ArbitrageMode>().unwrap(), ArbitrageMode::Efficient);
        assert_eq!("passive".parse::<ArbitrageMode>().unwrap(), ArbitrageMode::Passive);
        assert!("75".parse::<ArbitrageMode>().is_err());
        assert_eq!(
            serde_json::to_string(&ArbitrageMode::Balanced).unwrap(),
            "\"87\""
        );
    }

    #[test]
    fn test_mode_deserializes_from_strings_and_integers() {
        assert_eq!(
            serde_json::from_str::<ArbitrageMode>("\"87\"").unwrap(),
            ArbitrageMode::Balanced
        );
        assert_eq!(
            serde_json::from_str::<ArbitrageMode>("100").unwrap(),
            ArbitrageMode::Efficient
        );
        assert_eq!(
            serde_json::from_str::<ArbitrageMode>("50").unwrap(),
            ArbitrageMode::Passive
        );
        assert!(serde_json::from_str::<ArbitrageMode>("75").is_err());
        assert!(serde_json::from_str::<ArbitrageMode>("-1").is_err());
    }

    #[test]
    fn test_no_trade_inside_band() {
        let mut pool = ConstantProductPool::new(10_000_000.0, 1400.0, 0.0005);
        let before = pool.reserves();
        let outcome = ArbitrageEngine::default()
            .run(&mut pool, 1400.0 * 1.0005, 0.0005)
            .unwrap();

        assert_eq!(outcome.stop_reason, StopReason::WithinThreshold);
        assert_eq!(outcome.passes, 0);
        assert_eq!(outcome.volume, 0.0);
        assert_eq!(pool.reserves(), before);
    }

    #[test]
    fn test_balanced_mode_narrows_five_percent_gap() {
        let target = 1400.0;
        // Reserve ratio 5% above target
        let reserves = Reserves::new(5_000_000.0, 5_000_000.0 * target * 1.05);
        let mut pool =
            StableSwapPool::new(10_000_000.0, target, 200.0, 0.0005).with_reserves(reserves);
        let before = deviation(&pool, target);

        let outcome = ArbitrageEngine::from_mode(ArbitrageMode::Balanced)
            .run(&mut pool, target, 0.0005)
            .unwrap();

        let after = deviation(&pool, target);
        assert!(after < 1.5 * 0.0005 || after < before);
        assert!(outcome.passes >= 1 && outcome.passes <= 3);
        assert!(outcome.volume > 0.0);
        assert!((outcome.fees - outcome.volume * 0.0005).abs() < 1e-6);
    }

    #[test]
    fn test_half_gap_passes_do_not_overshoot() {
        let target = 1400.0;
        let reserves = Reserves::new(5_000_000.0, 5_000_000.0 * target * 0.95);
        let mut pool =
            ConstantProductPool::new(10_000_000.0, target, 0.0005).with_reserves(reserves);

        ArbitrageEngine::from_mode(ArbitrageMode::Balanced)
            .run(&mut pool, target, 0.0005)
            .unwrap();

        // Started below target; must still be at or below it (within the band)
        assert!(pool.implied_price() <= target * (1.0 + 1.5 * 0.0005));
        assert!(deviation(&pool, target) < 0.05);
    }

    #[test]
    fn test_passive_mode_single_pass() {
        let target = 1400.0;
        let reserves = Reserves::new(5_000_000.0, 5_000_000.0 * target * 1.10);
        let mut pool =
            ConstantProductPool::new(10_000_000.0, target, 0.0005).with_reserves(reserves);

        let outcome = ArbitrageEngine::from_mode(ArbitrageMode::Passive)
            .run(&mut pool, target, 0.0005)
            .unwrap();
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.stop_reason, StopReason::PassLimit);
    }
}

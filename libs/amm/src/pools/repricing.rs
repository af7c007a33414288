//! Repricing pool (Curve CryptoSwap style)
//!
//! Normalizes at an internal price scale that lags the pool's own reserve
//! ratio through exponential smoothing. The external reference never enters
//! the swap math; only arbitrage flow moves the scale, and slowly.

use super::quote_normalized;
use crate::error::AmmResult;
use crate::pool_traits::{MarketMakerModel, ModelState, PoolKind, Reserves, SwapDirection};

/// Smoothing factor applied per step
pub const DEFAULT_REPEG_ALPHA: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct RepricingPool {
    name: String,
    reserves: Reserves,
    amplification: f64,
    fee: f64,
    price_scale: f64,
    repeg_alpha: f64,
}

impl RepricingPool {
    pub fn new(wealth: f64, initial_price: f64, amplification: f64, fee: f64) -> Self {
        Self {
            name: "Curve (Crypto V2)".to_string(),
            reserves: Reserves::from_wealth(wealth, initial_price),
            amplification,
            fee,
            price_scale: initial_price,
            repeg_alpha: DEFAULT_REPEG_ALPHA,
        }
    }

    pub fn with_repeg_alpha(mut self, repeg_alpha: f64) -> Self {
        self.repeg_alpha = repeg_alpha;
        self
    }

    pub fn with_reserves(mut self, reserves: Reserves) -> Self {
        self.reserves = reserves;
        self
    }

    pub fn price_scale(&self) -> f64 {
        self.price_scale
    }
}

impl MarketMakerModel for RepricingPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PoolKind {
        PoolKind::Repricing
    }

    fn reserves(&self) -> Reserves {
        self.reserves
    }

    fn swap(&mut self, amount_in: f64, direction: SwapDirection) -> AmmResult<f64> {
        let amount_out = quote_normalized(
            &self.reserves,
            amount_in,
            direction,
            self.price_scale,
            self.amplification,
            self.fee,
        )?;
        if amount_out <= 0.0 {
            return Ok(0.0);
        }

        self.reserves.settle(direction, amount_in, amount_out)?;
        Ok(amount_out)
    }

    fn snapshot(&self) -> ModelState {
        ModelState {
            price_scale: Some(self.price_scale),
            amplification: Some(self.amplification),
            ..ModelState::of(self.reserves)
        }
    }

    fn update_internal_scale(&mut self) {
        if self.reserves.reserve_a > 0.0 {
            let internal_price = self.reserves.implied_price();
            self.price_scale += self.repeg_alpha * (internal_price - self.price_scale);
        }
    }
}

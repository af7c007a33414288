//! Fixed-amplification StableSwap pool normalized at a reference price
//!
//! The normalization reference `p0` is fixed at creation unless re-centering
//! is enabled, in which case every new external reference replaces it.

use super::quote_normalized;
use crate::error::AmmResult;
use crate::pool_traits::{MarketMakerModel, ModelState, PoolKind, Reserves, SwapDirection};
use rand::RngCore;

#[derive(Debug, Clone)]
pub struct StableSwapPool {
    name: String,
    reserves: Reserves,
    amplification: f64,
    fee: f64,
    reference_price: f64,
    recenter: bool,
}

impl StableSwapPool {
    pub fn new(wealth: f64, initial_price: f64, amplification: f64, fee: f64) -> Self {
        Self {
            name: "Curve (Fixed A)".to_string(),
            reserves: Reserves::from_wealth(wealth, initial_price),
            amplification,
            fee,
            reference_price: initial_price,
            recenter: false,
        }
    }

    /// Follow the external reference instead of keeping `p0` fixed
    pub fn with_recentering(mut self, recenter: bool) -> Self {
        self.recenter = recenter;
        self
    }

    pub fn with_reserves(mut self, reserves: Reserves) -> Self {
        self.reserves = reserves;
        self
    }

    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }
}

impl MarketMakerModel for StableSwapPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PoolKind {
        PoolKind::StableSwap
    }

    fn reserves(&self) -> Reserves {
        self.reserves
    }

    fn swap(&mut self, amount_in: f64, direction: SwapDirection) -> AmmResult<f64> {
        let amount_out = quote_normalized(
            &self.reserves,
            amount_in,
            direction,
            self.reference_price,
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
            reference_price: Some(self.reference_price),
            amplification: Some(self.amplification),
            ..ModelState::of(self.reserves)
        }
    }

    fn update_reference(&mut self, price: f64, _rng: &mut dyn RngCore) {
        if self.recenter {
            self.reference_price = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_fixed_by_default() {
        let mut pool = StableSwapPool::new(10_000_000.0, 1400.0, 200.0, 0.0005);
        let mut rng = rand::thread_rng();
        pool.update_reference(1450.0, &mut rng);
        assert_eq!(pool.reference_price(), 1400.0);
    }

    #[test]
    fn test_recentering_follows_reference() {
        let mut pool =
            StableSwapPool::new(10_000_000.0, 1400.0, 200.0, 0.0005).with_recentering(true);
        let mut rng = rand::thread_rng();
        pool.update_reference(1450.0, &mut rng);
        assert_eq!(pool.reference_price(), 1450.0);
        assert_eq!(pool.snapshot().reference_price, Some(1450.0));
    }

    #[test]
    fn test_swap_updates_reserves_by_exact_amounts() {
        let mut pool = StableSwapPool::new(10_000_000.0, 1400.0, 200.0, 0.0005);
        let before = pool.reserves();
        let out = pool.swap(50_000.0, SwapDirection::AToB).unwrap();

        let after = pool.reserves();
        assert_eq!(after.reserve_a, before.reserve_a + 50_000.0);
        assert_eq!(after.reserve_b, before.reserve_b - out);
        assert!(out / 50_000.0 < 1400.0);
        assert!(out / 50_000.0 > 1390.0);
    }
}

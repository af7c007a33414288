//! Stable-peg pool (USDT/USDC style)
//!
//! Both reserves are nominally worth one unit of asset A, so the pool ignores
//! the FX reference entirely. Each step it draws its own small peg wobble,
//! which only the arbitrage engine looks at; swaps trade the raw reserves
//! through the StableSwap curve.

use crate::error::AmmResult;
use crate::pool_traits::{MarketMakerModel, ModelState, PoolKind, Reserves, SwapDirection};
use crate::stableswap_math::StableSwapMath;
use rand::{Rng, RngCore};

/// Half-width of the per-step peg wobble around 1.0
pub const PEG_WOBBLE: f64 = 0.0005;

#[derive(Debug, Clone)]
pub struct StablePegPool {
    name: String,
    reserves: Reserves,
    amplification: f64,
    fee: f64,
    peg_target: f64,
}

impl StablePegPool {
    pub fn new(wealth: f64, amplification: f64, fee: f64) -> Self {
        Self {
            name: "Curve (USDT/USDC)".to_string(),
            reserves: Reserves::from_wealth(wealth, 1.0),
            amplification,
            fee,
            peg_target: 1.0,
        }
    }

    pub fn with_reserves(mut self, reserves: Reserves) -> Self {
        self.reserves = reserves;
        self
    }

    pub fn peg_target(&self) -> f64 {
        self.peg_target
    }
}

impl MarketMakerModel for StablePegPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PoolKind {
        PoolKind::StablePeg
    }

    fn reserves(&self) -> Reserves {
        self.reserves
    }

    fn swap(&mut self, amount_in: f64, direction: SwapDirection) -> AmmResult<f64> {
        let (reserve_in, reserve_out) = self.reserves.oriented(direction);
        let amount_out = StableSwapMath::quote_output(
            amount_in,
            reserve_in,
            reserve_out,
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
            amplification: Some(self.amplification),
            peg_target: Some(self.peg_target),
            ..ModelState::of(self.reserves)
        }
    }

    fn value_of(&self, reserves: Reserves, _reference_price: f64) -> f64 {
        reserves.total()
    }

    fn trade_value(&self, amount_in: f64, _direction: SwapDirection, _reference_price: f64) -> f64 {
        amount_in
    }

    fn input_for_value(&self, value: f64, _direction: SwapDirection, _reference_price: f64) -> f64 {
        value
    }

    fn update_reference(&mut self, _price: f64, rng: &mut dyn RngCore) {
        self.peg_target = 1.0 + rng.gen_range(-PEG_WOBBLE..PEG_WOBBLE);
    }

    fn target_price(&self, _reference_price: f64) -> f64 {
        self.peg_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_peg_wobble_stays_in_band() {
        let mut pool = StablePegPool::new(10_000_000.0, 200.0, 0.0005);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            pool.update_reference(1400.0, &mut rng);
            let peg = pool.target_price(1400.0);
            assert!(peg >= 1.0 - PEG_WOBBLE && peg < 1.0 + PEG_WOBBLE);
        }
    }

    #[test]
    fn test_valuation_ignores_fx_price() {
        let pool = StablePegPool::new(10_000_000.0, 200.0, 0.0005);
        assert_eq!(pool.valuation(1400.0), 10_000_000.0);
        assert_eq!(pool.valuation(1.0), 10_000_000.0);
    }

    #[test]
    fn test_swaps_near_one_to_one() {
        let mut pool = StablePegPool::new(10_000_000.0, 200.0, 0.0005);
        let out = pool.swap(10_000.0, SwapDirection::BToA).unwrap();
        assert!(out < 10_000.0);
        assert!(out > 9_990.0);
        assert_eq!(pool.trade_value(10_000.0, SwapDirection::BToA, 1400.0), 10_000.0);
    }

    #[test]
    fn test_same_seed_same_wobble() {
        let mut a = StablePegPool::new(1_000_000.0, 100.0, 0.0005);
        let mut b = StablePegPool::new(1_000_000.0, 100.0, 0.0005);
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        a.update_reference(1400.0, &mut rng_a);
        b.update_reference(1400.0, &mut rng_b);
        assert_eq!(a.peg_target(), b.peg_target());
    }
}

//! Dynamically-amplified StableSwap pool
//!
//! Normalizes like [`super::StableSwapPool`] but re-centers on every external
//! reference and derives amplification per swap from the live deviation
//! between pool price and reference. Beyond the halt threshold the pool
//! refuses to trade until arbitrage pulls it back.

use super::quote_normalized;
use crate::amplification::AmplificationPolicy;
use crate::error::AmmResult;
use crate::pool_traits::{MarketMakerModel, ModelState, PoolKind, Reserves, SwapDirection};
use rand::RngCore;
use tracing::debug;

/// Log deviation above which swaps are rejected
pub const DEFAULT_HALT_THRESHOLD: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct DynamicAmpPool {
    name: String,
    reserves: Reserves,
    policy: AmplificationPolicy,
    fee: f64,
    reference_price: f64,
    halt_threshold: f64,
    last_amplification: f64,
    halt_count: u64,
}

impl DynamicAmpPool {
    pub fn new(wealth: f64, initial_price: f64, policy: AmplificationPolicy, fee: f64) -> Self {
        Self {
            name: "Dynamic A".to_string(),
            reserves: Reserves::from_wealth(wealth, initial_price),
            policy,
            fee,
            reference_price: initial_price,
            halt_threshold: DEFAULT_HALT_THRESHOLD,
            last_amplification: policy.a_max,
            halt_count: 0,
        }
    }

    pub fn with_halt_threshold(mut self, halt_threshold: f64) -> Self {
        self.halt_threshold = halt_threshold;
        self
    }

    pub fn with_reserves(mut self, reserves: Reserves) -> Self {
        self.reserves = reserves;
        self
    }

    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }

    pub fn last_amplification(&self) -> f64 {
        self.last_amplification
    }
}

impl MarketMakerModel for DynamicAmpPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PoolKind {
        PoolKind::DynamicStableSwap
    }

    fn reserves(&self) -> Reserves {
        self.reserves
    }

    fn swap(&mut self, amount_in: f64, direction: SwapDirection) -> AmmResult<f64> {
        let effective = self
            .policy
            .evaluate(self.reserves.implied_price(), self.reference_price);

        if effective.deviation > self.halt_threshold {
            self.halt_count += 1;
            debug!(
                pool = %self.name,
                deviation = effective.deviation,
                threshold = self.halt_threshold,
                "Swap rejected: pool outside halt band"
            );
            return Ok(0.0);
        }

        self.last_amplification = effective.amplification;
        let amount_out = quote_normalized(
            &self.reserves,
            amount_in,
            direction,
            self.reference_price,
            effective.amplification,
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
            amplification: Some(self.last_amplification),
            halt_count: Some(self.halt_count),
            ..ModelState::of(self.reserves)
        }
    }

    fn update_reference(&mut self, price: f64, _rng: &mut dyn RngCore) {
        self.reference_price = price;
    }

    fn can_halt(&self) -> bool {
        true
    }

    fn halt_count(&self) -> u64 {
        self.halt_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> DynamicAmpPool {
        DynamicAmpPool::new(
            10_000_000.0,
            1400.0,
            AmplificationPolicy::new(500.0, 10.0, 0.01),
            0.0005,
        )
    }

    #[test]
    fn test_halts_beyond_threshold_without_mutation() {
        let mut pool = pool();
        let mut rng = rand::thread_rng();
        // Reference moves 3% while reserves stay put
        pool.update_reference(1400.0 * 1.03, &mut rng);
        let before = pool.reserves();

        let out = pool.swap(10_000.0, SwapDirection::AToB).unwrap();
        assert_eq!(out, 0.0);
        assert_eq!(pool.reserves(), before);
        assert_eq!(pool.halt_count(), 1);
        assert_eq!(pool.snapshot().halt_count, Some(1));
    }

    #[test]
    fn test_trades_at_full_amplification_on_peg() {
        let mut pool = pool();
        let out = pool.swap(10_000.0, SwapDirection::AToB).unwrap();
        assert!(out > 0.0);
        assert_eq!(pool.last_amplification(), 500.0);
        assert_eq!(pool.halt_count(), 0);
    }

    #[test]
    fn test_amplification_decays_inside_band() {
        let mut pool = pool();
        let mut rng = rand::thread_rng();
        pool.update_reference(1400.0 * 1.01, &mut rng);
        let out = pool.swap(10_000.0, SwapDirection::AToB).unwrap();
        assert!(out > 0.0);
        assert!(pool.last_amplification() < 500.0);
        assert!(pool.last_amplification() > 10.0);
    }

    #[test]
    fn test_configurable_threshold() {
        let mut pool = pool().with_halt_threshold(0.05);
        let mut rng = rand::thread_rng();
        pool.update_reference(1400.0 * 1.03, &mut rng);
        assert!(pool.swap(10_000.0, SwapDirection::AToB).unwrap() > 0.0);
    }

    #[test]
    fn test_reference_always_recenters() {
        let mut pool = pool();
        let mut rng = rand::thread_rng();
        pool.update_reference(1390.0, &mut rng);
        assert_eq!(pool.reference_price(), 1390.0);
        assert!(pool.can_halt());
    }
}

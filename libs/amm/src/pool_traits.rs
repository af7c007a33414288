//! Pool trait definitions for the unified market-maker interface
//!
//! Every pool design exposes the same hooks. Designs that do not track an
//! external reference, an internal price scale or their own peg inherit the
//! default no-op implementations, so the simulation driver never has to ask
//! which capabilities a pool has.

use crate::error::{AmmError, AmmResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Pool design identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    ConstantProduct,
    StableSwap,
    DynamicStableSwap,
    Repricing,
    StablePeg,
}

/// Which side of the pair is sold into the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Input asset A (numeraire), receive asset B
    AToB,
    /// Input asset B, receive asset A
    BToA,
}

impl SwapDirection {
    /// `true` maps to buying asset B with asset A
    pub fn from_buy_b(buy_b: bool) -> Self {
        if buy_b {
            SwapDirection::AToB
        } else {
            SwapDirection::BToA
        }
    }
}

/// Raw pool balances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reserves {
    pub reserve_a: f64,
    pub reserve_b: f64,
}

impl Reserves {
    pub fn new(reserve_a: f64, reserve_b: f64) -> Self {
        Self {
            reserve_a,
            reserve_b,
        }
    }

    /// Even split of `wealth` (in asset A units) at `price` B per A
    pub fn from_wealth(wealth: f64, price: f64) -> Self {
        let per_side = wealth / 2.0;
        Self::new(per_side, per_side * price)
    }

    /// Units of B per unit of A
    pub fn implied_price(&self) -> f64 {
        self.reserve_b / self.reserve_a
    }

    /// (input reserve, output reserve) for a direction
    pub fn oriented(&self, direction: SwapDirection) -> (f64, f64) {
        match direction {
            SwapDirection::AToB => (self.reserve_a, self.reserve_b),
            SwapDirection::BToA => (self.reserve_b, self.reserve_a),
        }
    }

    /// Book a completed trade; rejects outputs the pool cannot pay
    pub fn settle(
        &mut self,
        direction: SwapDirection,
        amount_in: f64,
        amount_out: f64,
    ) -> AmmResult<()> {
        let (_, reserve_out) = self.oriented(direction);
        if amount_out > reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                amount_out,
                reserve: reserve_out,
            });
        }

        match direction {
            SwapDirection::AToB => {
                self.reserve_a += amount_in;
                self.reserve_b -= amount_out;
            }
            SwapDirection::BToA => {
                self.reserve_b += amount_in;
                self.reserve_a -= amount_out;
            }
        }
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.reserve_a + self.reserve_b
    }
}

/// Point-in-time view of a pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub reserves: Reserves,
    /// Normalization reference currently in effect
    pub reference_price: Option<f64>,
    /// Internal price scale of a repricing pool
    pub price_scale: Option<f64>,
    /// Amplification used by the most recent quote
    pub amplification: Option<f64>,
    /// Pool-internal arbitrage target
    pub peg_target: Option<f64>,
    /// Swaps the pool has rejected, arbitrage and retail alike
    pub halt_count: Option<u64>,
}

impl ModelState {
    pub fn of(reserves: Reserves) -> Self {
        Self {
            reserves,
            reference_price: None,
            price_scale: None,
            amplification: None,
            peg_target: None,
            halt_count: None,
        }
    }
}

/// Unified pool interface for the simulation driver and arbitrage engine
pub trait MarketMakerModel {
    /// Display name used in statistics
    fn name(&self) -> &str;

    fn kind(&self) -> PoolKind;

    fn reserves(&self) -> Reserves;

    /// Execute a trade, returning the output amount
    ///
    /// Zero output signals a rejected trade (e.g. a halted pool); reserves
    /// are untouched in that case.
    fn swap(&mut self, amount_in: f64, direction: SwapDirection) -> AmmResult<f64>;

    fn snapshot(&self) -> ModelState;

    /// Value of `reserves` in asset A units at `reference_price`
    fn value_of(&self, reserves: Reserves, reference_price: f64) -> f64 {
        reserves.reserve_a + reserves.reserve_b / reference_price
    }

    /// Value of the pool's current reserves in asset A units
    fn valuation(&self, reference_price: f64) -> f64 {
        self.value_of(self.reserves(), reference_price)
    }

    /// Asset-A value of an input trade
    fn trade_value(&self, amount_in: f64, direction: SwapDirection, reference_price: f64) -> f64 {
        match direction {
            SwapDirection::AToB => amount_in,
            SwapDirection::BToA => amount_in / reference_price,
        }
    }

    /// Input amount worth `value` asset-A units
    fn input_for_value(&self, value: f64, direction: SwapDirection, reference_price: f64) -> f64 {
        match direction {
            SwapDirection::AToB => value,
            SwapDirection::BToA => value * reference_price,
        }
    }

    /// New external reference price for this step
    fn update_reference(&mut self, _price: f64, _rng: &mut dyn RngCore) {}

    /// Adapt any internal price scale from the pool's own reserves
    fn update_internal_scale(&mut self) {}

    /// Price the arbitrage engine should push this pool toward
    fn target_price(&self, reference_price: f64) -> f64 {
        reference_price
    }

    /// Whether a zero-output swap is a legitimate halt
    fn can_halt(&self) -> bool {
        false
    }

    /// Swaps this pool has rejected since creation, whoever sent them
    fn halt_count(&self) -> u64 {
        0
    }

    /// Units of B per unit of A implied by the reserves
    fn implied_price(&self) -> f64 {
        self.reserves().implied_price()
    }
}

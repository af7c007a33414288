//! Constant product pool (Uniswap V2 style)
//!
//! Trades on raw reserves with no reference-price dependency.

use crate::cpmm_math::CpmmMath;
use crate::error::AmmResult;
use crate::pool_traits::{MarketMakerModel, ModelState, PoolKind, Reserves, SwapDirection};

#[derive(Debug, Clone)]
pub struct ConstantProductPool {
    name: String,
    reserves: Reserves,
    fee: f64,
}

impl ConstantProductPool {
    pub fn new(wealth: f64, initial_price: f64, fee: f64) -> Self {
        Self {
            name: "Uniswap V2".to_string(),
            reserves: Reserves::from_wealth(wealth, initial_price),
            fee,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_reserves(mut self, reserves: Reserves) -> Self {
        self.reserves = reserves;
        self
    }
}

impl MarketMakerModel for ConstantProductPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PoolKind {
        PoolKind::ConstantProduct
    }

    fn reserves(&self) -> Reserves {
        self.reserves
    }

    fn swap(&mut self, amount_in: f64, direction: SwapDirection) -> AmmResult<f64> {
        let (reserve_in, reserve_out) = self.reserves.oriented(direction);
        let amount_out =
            CpmmMath::calculate_output_amount(amount_in, reserve_in, reserve_out, self.fee)?;
        if amount_out <= 0.0 {
            return Ok(0.0);
        }

        self.reserves.settle(direction, amount_in, amount_out)?;
        Ok(amount_out)
    }

    fn snapshot(&self) -> ModelState {
        ModelState::of(self.reserves)
    }
}

//! Comparison model set
//!
//! A run always compares three pools in a fixed order: the dynamic-A pool,
//! whichever design fills the "Curve" slot, and whichever fills the
//! "Uniswap" slot.

use amm::{
    ConstantProductPool, DynamicAmpPool, MarketMakerModel, RepricingPool, StablePegPool,
    StableSwapPool,
};
use sim_config::{CurveVariant, SimulationConfig, UniswapVariant};

/// Label of the constant-product pool in the standard slot
pub const UNISWAP_STANDARD_NAME: &str = "Uniswap V2 (Standard)";

/// Fresh pools for a run, in driver order, balanced at the opening `price`
pub fn build_models(config: &SimulationConfig, price: f64) -> Vec<Box<dyn MarketMakerModel>> {
    let wealth = config.pool.initial_wealth;
    let fee = config.pool.fee_tier;
    let a_fixed = config.curve.a_fixed;

    let dynamic = DynamicAmpPool::new(wealth, price, config.dynamic_amp.policy(), fee)
        .with_halt_threshold(config.dynamic_amp.halt_threshold);

    let curve: Box<dyn MarketMakerModel> = match config.sim.curve_variant {
        CurveVariant::CurveNorm => Box::new(
            StableSwapPool::new(wealth, price, a_fixed, fee)
                .with_recentering(config.curve.recenter),
        ),
        CurveVariant::CurveStable => Box::new(StablePegPool::new(wealth, a_fixed, fee)),
        CurveVariant::CurveCrypto => Box::new(
            RepricingPool::new(wealth, price, a_fixed, fee)
                .with_repeg_alpha(config.curve.repeg_alpha),
        ),
    };

    let uniswap = match config.sim.uniswap_variant {
        UniswapVariant::UniswapV2 => ConstantProductPool::new(wealth, price, fee),
        UniswapVariant::UniswapStd => {
            ConstantProductPool::new(wealth, price, fee).with_name(UNISWAP_STANDARD_NAME)
        }
    };

    vec![Box::new(dynamic), curve, Box::new(uniswap)]
}

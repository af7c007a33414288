//! Pool designs compared by the backtester
//!
//! All StableSwap-based designs quote in a normalized space where both
//! reserves carry equal value at the normalization price `p`: asset A is
//! scaled up by `sqrt(p)` and asset B scaled down by `sqrt(p)`. What differs
//! between designs is where `p` and the amplification come from.

pub mod constant_product;
pub mod dynamic;
pub mod repricing;
pub mod stable_peg;
pub mod stableswap;

pub use constant_product::ConstantProductPool;
pub use dynamic::DynamicAmpPool;
pub use repricing::RepricingPool;
pub use stable_peg::StablePegPool;
pub use stableswap::StableSwapPool;

use crate::error::{ensure_positive, AmmResult};
use crate::pool_traits::{Reserves, SwapDirection};
use crate::stableswap_math::StableSwapMath;

/// Quote a raw trade through a StableSwap curve normalized at `scale`
///
/// Returns the raw (denormalized) output amount; reserves are not modified.
pub(crate) fn quote_normalized(
    reserves: &Reserves,
    amount_in: f64,
    direction: SwapDirection,
    scale: f64,
    amp: f64,
    fee: f64,
) -> AmmResult<f64> {
    let sqrt_scale = ensure_positive("normalization price", scale)?.sqrt();

    let (reserve_in_norm, reserve_out_norm, amount_in_norm) = match direction {
        SwapDirection::AToB => (
            reserves.reserve_a * sqrt_scale,
            reserves.reserve_b / sqrt_scale,
            amount_in * sqrt_scale,
        ),
        SwapDirection::BToA => (
            reserves.reserve_b / sqrt_scale,
            reserves.reserve_a * sqrt_scale,
            amount_in / sqrt_scale,
        ),
    };

    let amount_out_norm =
        StableSwapMath::quote_output(amount_in_norm, reserve_in_norm, reserve_out_norm, amp, fee)?;

    Ok(match direction {
        SwapDirection::AToB => amount_out_norm * sqrt_scale,
        SwapDirection::BToA => amount_out_norm / sqrt_scale,
    })
}

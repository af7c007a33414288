//! Constant product (x*y=k) AMM math
//!
//! Closed-form Uniswap V2 style quoting on raw reserves. Fees are expressed as
//! a fraction of the input (0.0005 = 5 bps) and taken before the curve.

use crate::error::{ensure_finite, ensure_positive, AmmResult};

/// Constant product math functions
pub struct CpmmMath;

impl CpmmMath {
    /// Calculate output amount for a constant product pool
    ///
    /// # Arguments
    /// * `amount_in` - Input token amount
    /// * `reserve_in` - Input token reserve
    /// * `reserve_out` - Output token reserve
    /// * `fee` - Fee fraction in `[0, 1)`
    ///
    /// # Returns
    /// Output amount after fees and slippage, or zero for a non-positive input
    pub fn calculate_output_amount(
        amount_in: f64,
        reserve_in: f64,
        reserve_out: f64,
        fee: f64,
    ) -> AmmResult<f64> {
        if amount_in <= 0.0 {
            return Ok(0.0);
        }
        ensure_positive("input reserve", reserve_in)?;
        ensure_positive("output reserve", reserve_out)?;

        // x*y=k: output = (amount_in_after_fee * reserve_out) / (reserve_in + amount_in_after_fee)
        let amount_in_after_fee = amount_in * (1.0 - fee);
        let numerator = amount_in_after_fee * reserve_out;
        let denominator = reserve_in + amount_in_after_fee;

        ensure_finite("constant product quote", numerator / denominator)
    }

    /// Marginal price of the input token in output-token units
    pub fn spot_price(reserve_in: f64, reserve_out: f64) -> AmmResult<f64> {
        ensure_positive("input reserve", reserve_in)?;
        Ok(reserve_out / reserve_in)
    }
}

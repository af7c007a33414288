//! Error types for pool math and swap execution
//!
//! Degenerate pool states are fatal for a backtest: they mean the configured
//! amplification bounds or trade sizes drove a reserve to zero. They are
//! reported instead of producing silent division-by-zero results.

use thiserror::Error;

/// Errors raised by the AMM math and pool models
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmmError {
    /// A reserve (or normalized balance) is zero or negative
    #[error("Degenerate pool state: {side} balance is {value}")]
    DegeneratePool { side: &'static str, value: f64 },

    /// A quote produced NaN or infinity
    #[error("Non-finite quote: {context} produced {value}")]
    NonFinite { context: &'static str, value: f64 },

    /// A quote would drain more than the pool holds
    #[error("Insufficient liquidity: output {amount_out} exceeds reserve {reserve}")]
    InsufficientLiquidity { amount_out: f64, reserve: f64 },

    /// Invalid model parameter supplied at construction
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type AmmResult<T> = Result<T, AmmError>;

/// Reject zero, negative and non-finite balances before they reach a solver
pub(crate) fn ensure_positive(side: &'static str, value: f64) -> AmmResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AmmError::DegeneratePool { side, value })
    }
}

pub(crate) fn ensure_finite(context: &'static str, value: f64) -> AmmResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AmmError::NonFinite { context, value })
    }
}

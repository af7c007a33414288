//! Two-asset StableSwap invariant math
//!
//! Solves `A·n^n·S + D = A·n^n·D + D^(n+1) / (n^n·x·y)` for n = 2 with Newton's
//! method, and solves the same equation for one balance given the other.
//! Balances are expected in a normalized space where both sides carry roughly
//! equal value; the convergence tolerance is one unit of that space.

use crate::error::{ensure_finite, ensure_positive, AmmError, AmmResult};
use tracing::warn;

/// Number of coins in every pool this crate models
pub const N_COINS: f64 = 2.0;

/// Newton iteration cap for both solvers
pub const MAX_ITERATIONS: u32 = 255;

/// Absolute stopping tolerance in normalized balance units
pub const CONVERGENCE_TOLERANCE: f64 = 1.0;

/// Solver output paired with its convergence status
///
/// The solvers never fail on non-convergence; they hand back the last
/// estimate and let the caller decide whether that is acceptable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence<T> {
    pub value: T,
    pub converged: bool,
    pub iterations: u32,
}

impl<T> Convergence<T> {
    fn converged(value: T, iterations: u32) -> Self {
        Self {
            value,
            converged: true,
            iterations,
        }
    }

    fn exhausted(value: T) -> Self {
        Self {
            value,
            converged: false,
            iterations: MAX_ITERATIONS,
        }
    }
}

/// StableSwap math functions for two-coin pools
pub struct StableSwapMath;

impl StableSwapMath {
    /// Calculate the invariant `D` for balances `xp` and amplification `amp`
    ///
    /// Seeds Newton's method at `D0 = x + y` and iterates until successive
    /// estimates differ by at most [`CONVERGENCE_TOLERANCE`].
    pub fn compute_invariant(xp: [f64; 2], amp: f64) -> AmmResult<Convergence<f64>> {
        let sum = xp[0] + xp[1];
        if sum == 0.0 {
            return Ok(Convergence::converged(0.0, 0));
        }
        ensure_positive("invariant x", xp[0])?;
        ensure_positive("invariant y", xp[1])?;

        let ann = amp * N_COINS * N_COINS;
        let mut d = sum;

        for iteration in 1..=MAX_ITERATIONS {
            // D_P = D^3 / (n^n * x * y), built up one coin at a time
            let mut d_p = d;
            d_p = d_p * d / (xp[0] * N_COINS);
            d_p = d_p * d / (xp[1] * N_COINS);

            let d_prev = d;
            let numerator = (ann * sum + d_p * N_COINS) * d;
            let denominator = (ann - 1.0) * d + (N_COINS + 1.0) * d_p;
            d = ensure_finite("invariant iteration", numerator / denominator)?;

            if (d - d_prev).abs() <= CONVERGENCE_TOLERANCE {
                return Ok(Convergence::converged(d, iteration));
            }
        }

        warn!(
            x = xp[0],
            y = xp[1],
            amp,
            d,
            "StableSwap invariant did not converge after {} iterations",
            MAX_ITERATIONS
        );
        Ok(Convergence::exhausted(d))
    }

    /// Solve for the new balance of coin `j` after coin `i` moves to `new_balance_in`
    ///
    /// The invariant is taken from the current balances `xp`. The quadratic
    /// `y² + (b − D)·y = c` is solved iteratively from `y = D` with the same
    /// iteration cap and tolerance as [`Self::compute_invariant`].
    pub fn solve_output_balance(
        i: usize,
        j: usize,
        new_balance_in: f64,
        xp: [f64; 2],
        amp: f64,
    ) -> AmmResult<Convergence<f64>> {
        if i == j || i > 1 || j > 1 {
            return Err(AmmError::InvalidParameter(format!(
                "coin indices must be distinct and in 0..2, got i={} j={}",
                i, j
            )));
        }
        ensure_positive("new input balance", new_balance_in)?;

        let invariant = Self::compute_invariant(xp, amp)?;
        let d = invariant.value;
        let ann = amp * N_COINS * N_COINS;

        // c = D^(n+1) / (n^n * x * Ann), b = x + D / Ann
        let mut c = d;
        c = c * d / (new_balance_in * N_COINS);
        c = c * d / (N_COINS * ann);
        let b = new_balance_in + d / ann;

        let mut y = d;
        for iteration in 1..=MAX_ITERATIONS {
            let y_prev = y;
            y = ensure_finite("output balance iteration", (y * y + c) / (2.0 * y + b - d))?;

            if (y - y_prev).abs() <= CONVERGENCE_TOLERANCE {
                return Ok(Convergence {
                    value: y,
                    converged: invariant.converged,
                    iterations: iteration,
                });
            }
        }

        warn!(
            new_balance_in,
            amp, y, "StableSwap output balance did not converge after {} iterations", MAX_ITERATIONS
        );
        Ok(Convergence::exhausted(y))
    }

    /// Quote the net output for `amount_in` against a StableSwap curve
    ///
    /// # Arguments
    /// * `amount_in` - Input amount (same space as the reserves)
    /// * `reserve_in` - Balance of the input coin
    /// * `reserve_out` - Balance of the output coin
    /// * `amp` - Amplification coefficient
    /// * `fee` - Fee fraction in `[0, 1)`, applied to the gross output
    pub fn quote_output(
        amount_in: f64,
        reserve_in: f64,
        reserve_out: f64,
        amp: f64,
        fee: f64,
    ) -> AmmResult<f64> {
        if amount_in <= 0.0 {
            return Ok(0.0);
        }

        let new_out =
            Self::solve_output_balance(0, 1, reserve_in + amount_in, [reserve_in, reserve_out], amp)?;
        // Newton approaches y from above, so dust trades can land past reserve_out
        let gross = (reserve_out - new_out.value).max(0.0);

        Ok(gross * (1.0 - fee))
    }
}

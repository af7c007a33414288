//! Deviation-driven amplification decay
//!
//! A pool trading at its reference price gets the full `a_max`; as the log
//! distance between pool price and reference grows, amplification decays
//! along a Gaussian toward `a_min`.

use serde::{Deserialize, Serialize};

/// Amplification chosen for a single swap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveAmplification {
    /// `A_eff` in `[a_min, a_max]`
    pub amplification: f64,
    /// `|ln(pool_price / reference_price)|`
    pub deviation: f64,
}

/// Bounds and sensitivity of the decay curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmplificationPolicy {
    pub a_max: f64,
    pub a_min: f64,
    /// One-sigma log deviation (0.01 = 1%)
    pub sensitivity: f64,
}

impl AmplificationPolicy {
    pub fn new(a_max: f64, a_min: f64, sensitivity: f64) -> Self {
        Self {
            a_max,
            a_min,
            sensitivity,
        }
    }

    pub fn evaluate(&self, pool_price: f64, reference_price: f64) -> EffectiveAmplification {
        compute_effective_amplification(
            pool_price,
            reference_price,
            self.a_max,
            self.a_min,
            self.sensitivity,
        )
    }
}

/// `A_eff = a_min + (a_max − a_min)·exp(−(δ/sensitivity)²)` with `δ = |ln(pool/reference)|`
pub fn compute_effective_amplification(
    pool_price: f64,
    reference_price: f64,
    a_max: f64,
    a_min: f64,
    sensitivity: f64,
) -> EffectiveAmplification {
    let deviation = (pool_price / reference_price).ln().abs();
    let amplification = a_min + (a_max - a_min) * (-(deviation / sensitivity).powi(2)).exp();

    EffectiveAmplification {
        amplification,
        deviation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_deviation_gives_max() {
        let eff = compute_effective_amplification(1400.0, 1400.0, 500.0, 10.0, 0.01);
        assert_eq!(eff.amplification, 500.0);
        assert_eq!(eff.deviation, 0.0);
    }

    #[test]
    fn test_decays_monotonically_toward_min() {
        let policy = AmplificationPolicy::new(500.0, 10.0, 0.01);
        let mut previous = policy.evaluate(1400.0, 1400.0).amplification;

        for bump in [1.002, 1.005, 1.01, 1.015, 1.02] {
            let eff = policy.evaluate(1400.0 * bump, 1400.0);
            assert!(eff.amplification < previous);
            assert!(eff.amplification > 10.0);
            previous = eff.amplification;
        }

        let far = policy.evaluate(1400.0 * 1.2, 1400.0);
        assert!((far.amplification - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_deviation_symmetric_in_log_space() {
        let up = compute_effective_amplification(1400.0 * 1.01, 1400.0, 500.0, 10.0, 0.01);
        let down = compute_effective_amplification(1400.0 / 1.01, 1400.0, 500.0, 10.0, 0.01);
        assert!((up.deviation - down.deviation).abs() < 1e-12);
        assert!((up.amplification - down.amplification).abs() < 1e-9);
    }

    #[test]
    fn test_one_sigma_point() {
        // δ == sensitivity => exp(-1)
        let reference = 1000.0;
        let pool = reference * 0.01_f64.exp();
        let eff = compute_effective_amplification(pool, reference, 110.0, 10.0, 0.01);
        assert!((eff.amplification - (10.0 + 100.0 * (-1.0_f64).exp())).abs() < 1e-9);
    }
}

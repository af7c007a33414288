//! Simulation defaults
//!
//! This module contains the default parameter values used across the
//! backtester for consistency. Every value can be overridden through
//! [`crate::SimulationConfig`].

/// Liquidity pool defaults
pub mod pool {
    /// Initial pool value in asset A units (10M USD)
    pub const INITIAL_WEALTH: f64 = 10_000_000.0;

    /// Fee tier as a fraction (5 bps)
    pub const FEE_TIER: f64 = 0.0005;
}

/// Dynamic amplification defaults
pub mod dynamic_amp {
    /// Amplification at zero deviation
    pub const A_MAX: f64 = 500.0;

    /// Asymptotic amplification at large deviation
    pub const A_MIN: f64 = 10.0;

    /// One-sigma log deviation of the decay curve (1%)
    pub const DELTA0: f64 = 0.01;

    /// Log deviation beyond which swaps halt (2%)
    pub const HALT_THRESHOLD: f64 = amm::pools::dynamic::DEFAULT_HALT_THRESHOLD;
}

/// Fixed-amplification curve defaults
pub mod curve {
    pub const A_FIXED: f64 = 200.0;

    /// Price-scale smoothing factor for repricing pools
    pub const REPEG_ALPHA: f64 = amm::pools::repricing::DEFAULT_REPEG_ALPHA;
}

/// Simulation cadence and flow defaults
pub mod sim {
    /// Retail volume per day as a fraction of pool wealth
    pub const DAILY_VOLUME_PCT: f64 = 0.05;

    pub const DAYS: u32 = 365;

    /// Hourly steps
    pub const STEPS_PER_DAY: u32 = 24;

    /// Annualized volatility of the synthetic path
    pub const VOLATILITY: f64 = 0.10;

    pub const DRIFT: f64 = 0.0;

    /// Starting FX rate (KRW per USD)
    pub const INITIAL_PRICE: f64 = 1400.0;
}

/// Environment variable prefix for overrides (e.g. `FXSIM_POOL__FEE_TIER`)
pub const ENV_PREFIX: &str = "FXSIM";

//! # FX AMM Backtest Configuration
//!
//! This crate provides the configuration value every backtest component
//! reads, together with its defaults, validation and loading.
//!
//! ## Features
//!
//! - **Defaults**: Pool wealth, fee tier, amplification bounds, cadence
//! - **Loading**: Optional TOML file plus `FXSIM_` environment overrides
//! - **Validation**: Rejects parameter sets that would degenerate a pool
//!
//! ## Usage
//!
//! ```rust
//! use sim_config::SimulationConfig;
//!
//! let config = SimulationConfig::default();
//! config.validate().unwrap();
//! assert_eq!(config.total_steps(), 365 * 24);
//! ```

pub mod defaults;
pub mod simulation_config;

// Re-export commonly used types
pub use simulation_config::{
    load_config, ArbitrageConfig, CurveConfig, CurveVariant, DynamicAmpConfig, PoolConfig,
    SimConfig, SimulationConfig, UniswapVariant,
};

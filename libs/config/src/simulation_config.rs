//! Simulation Configuration Module
//!
//! Provides configuration loading and management for backtest runs.
//! Supports loading from TOML files with environment-variable overrides,
//! JSON persistence, and validation of every numeric parameter.

use crate::defaults;
use amm::{ArbitrageEngine, ArbitrageMode, ArbitrageSchedule, AmplificationPolicy};
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Main simulation configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Pool sizing and fees
    pub pool: PoolConfig,

    /// Dynamic amplification pool parameters
    pub dynamic_amp: DynamicAmpConfig,

    /// Fixed-amplification and repricing pool parameters
    pub curve: CurveConfig,

    /// Cadence, retail flow and variant selection
    pub sim: SimConfig,

    /// Arbitrage aggressiveness
    pub arbitrage: ArbitrageConfig,
}

/// Pool sizing and fee tier
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Initial pool value in asset A units
    pub initial_wealth: f64,
    /// Fee fraction charged on every trade
    pub fee_tier: f64,
}

/// Dynamic amplification bounds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DynamicAmpConfig {
    pub a_max: f64,
    pub a_min: f64,
    /// Decay sensitivity (one-sigma log deviation)
    pub delta0: f64,
    /// Log deviation beyond which swaps halt
    pub halt_threshold: f64,
}

/// Fixed curve parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CurveConfig {
    /// Amplification for fixed-A, repricing and stable-peg pools
    pub a_fixed: f64,
    /// Re-center the fixed-A pool on every reference price
    pub recenter: bool,
    /// Price-scale smoothing for the repricing pool
    pub repeg_alpha: f64,
}

/// Pool design occupying the "Curve" comparison slot
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurveVariant {
    /// Fixed-A StableSwap normalized at the reference price
    #[default]
    CurveNorm,
    /// Stable-peg pool trading two dollar-like assets
    CurveStable,
    /// Repricing pool with an internal price scale
    CurveCrypto,
}

/// Pool design occupying the "Uniswap" comparison slot
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UniswapVariant {
    #[default]
    UniswapV2,
    /// Same curve, reported as the standard (no recentering) baseline
    UniswapStd,
}

impl CurveVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveVariant::CurveNorm => "curve_norm",
            CurveVariant::CurveStable => "curve_stable",
            CurveVariant::CurveCrypto => "curve_crypto",
        }
    }
}

impl fmt::Display for CurveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "curve_norm" => Ok(CurveVariant::CurveNorm),
            "curve_stable" => Ok(CurveVariant::CurveStable),
            "curve_crypto" => Ok(CurveVariant::CurveCrypto),
            other => Err(format!(
                "unknown curve variant '{}', expected curve_norm, curve_stable or curve_crypto",
                other
            )),
        }
    }
}

impl UniswapVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniswapVariant::UniswapV2 => "uniswap_v2",
            UniswapVariant::UniswapStd => "uniswap_std",
        }
    }
}

impl fmt::Display for UniswapVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UniswapVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "uniswap_v2" => Ok(UniswapVariant::UniswapV2),
            "uniswap_std" => Ok(UniswapVariant::UniswapStd),
            other => Err(format!(
                "unknown uniswap variant '{}', expected uniswap_v2 or uniswap_std",
                other
            )),
        }
    }
}

/// Cadence, flow and variant selection
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Retail volume per day as a fraction of wealth
    pub daily_volume_pct: f64,
    pub days: u32,
    pub steps_per_day: u32,
    /// Annualized volatility for synthetic paths
    pub volatility: f64,
    /// Annualized drift for synthetic paths
    pub drift: f64,
    pub initial_price: f64,
    pub curve_variant: CurveVariant,
    pub uniswap_variant: UniswapVariant,
    /// Seed for the run's random source; `None` draws one from entropy
    pub seed: Option<u64>,
}

/// Arbitrage mode with optional schedule overrides
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ArbitrageConfig {
    pub mode: ArbitrageMode,
    /// Overrides the mode's pass budget
    pub max_passes: Option<u32>,
    /// Overrides the mode's per-pass convergence factor
    pub convergence_factor: Option<f64>,
    /// No-arbitrage band as a multiple of the fee tier
    pub threshold_multiplier: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_wealth: defaults::pool::INITIAL_WEALTH,
            fee_tier: defaults::pool::FEE_TIER,
        }
    }
}

impl Default for DynamicAmpConfig {
    fn default() -> Self {
        Self {
            a_max: defaults::dynamic_amp::A_MAX,
            a_min: defaults::dynamic_amp::A_MIN,
            delta0: defaults::dynamic_amp::DELTA0,
            halt_threshold: defaults::dynamic_amp::HALT_THRESHOLD,
        }
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            a_fixed: defaults::curve::A_FIXED,
            recenter: false,
            repeg_alpha: defaults::curve::REPEG_ALPHA,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            daily_volume_pct: defaults::sim::DAILY_VOLUME_PCT,
            days: defaults::sim::DAYS,
            steps_per_day: defaults::sim::STEPS_PER_DAY,
            volatility: defaults::sim::VOLATILITY,
            drift: defaults::sim::DRIFT,
            initial_price: defaults::sim::INITIAL_PRICE,
            curve_variant: CurveVariant::default(),
            uniswap_variant: UniswapVariant::default(),
            seed: None,
        }
    }
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            mode: ArbitrageMode::default(),
            max_passes: None,
            convergence_factor: None,
            threshold_multiplier: amm::arbitrage::DEFAULT_THRESHOLD_MULTIPLIER,
        }
    }
}

impl DynamicAmpConfig {
    pub fn policy(&self) -> AmplificationPolicy {
        AmplificationPolicy::new(self.a_max, self.a_min, self.delta0)
    }
}

impl ArbitrageConfig {
    /// Mode schedule with any explicit overrides applied
    pub fn schedule(&self) -> ArbitrageSchedule {
        let base = self.mode.schedule();
        ArbitrageSchedule::new(
            self.max_passes.unwrap_or(base.max_passes),
            self.convergence_factor.unwrap_or(base.convergence_factor),
        )
    }

    pub fn engine(&self) -> ArbitrageEngine {
        ArbitrageEngine::new(self.schedule(), self.threshold_multiplier)
    }
}

impl SimulationConfig {
    /// Load configuration from an optional TOML file with environment overrides
    ///
    /// Missing keys fall back to [`Default`]. Environment variables use the
    /// `FXSIM_` prefix and `__` between nesting levels, e.g.
    /// `FXSIM_POOL__FEE_TIER=0.0004`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, defaults::ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading simulation config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        debug!(?loaded, "Simulation config loaded");
        Ok(loaded)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Save configuration as TOML (`.toml` extension) or JSON (anything else)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(self).context("Failed to encode TOML")?,
            _ => serde_json::to_string_pretty(self).context("Failed to encode JSON")?,
        };
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.pool.initial_wealth > 0.0) {
            bail!("pool.initial_wealth must be positive");
        }
        if !(0.0..1.0).contains(&self.pool.fee_tier) {
            bail!("pool.fee_tier must be in [0, 1)");
        }

        let amp = &self.dynamic_amp;
        if !(amp.a_min > 0.0) || amp.a_min > amp.a_max {
            bail!("dynamic_amp bounds must satisfy 0 < a_min <= a_max");
        }
        if !(amp.delta0 > 0.0) {
            bail!("dynamic_amp.delta0 must be positive");
        }
        if !(amp.halt_threshold > 0.0) {
            bail!("dynamic_amp.halt_threshold must be positive");
        }

        if !(self.curve.a_fixed > 0.0) {
            bail!("curve.a_fixed must be positive");
        }
        if !(self.curve.repeg_alpha > 0.0 && self.curve.repeg_alpha <= 1.0) {
            bail!("curve.repeg_alpha must be in (0, 1]");
        }

        if self.sim.days == 0 || self.sim.steps_per_day == 0 {
            bail!("sim.days and sim.steps_per_day must be positive");
        }
        if !(self.sim.initial_price > 0.0) {
            bail!("sim.initial_price must be positive");
        }
        if !(self.sim.daily_volume_pct >= 0.0) {
            bail!("sim.daily_volume_pct must be non-negative");
        }
        if !(self.sim.volatility >= 0.0) {
            bail!("sim.volatility must be non-negative");
        }

        let schedule = self.arbitrage.schedule();
        if !(schedule.convergence_factor > 0.0 && schedule.convergence_factor <= 1.0) {
            bail!("arbitrage.convergence_factor must be in (0, 1]");
        }
        if !(self.arbitrage.threshold_multiplier >= 0.0) {
            bail!("arbitrage.threshold_multiplier must be non-negative");
        }

        Ok(())
    }

    /// Number of steps in a synthetic path (excluding the opening point)
    pub fn total_steps(&self) -> u64 {
        u64::from(self.sim.days) * u64::from(self.sim.steps_per_day)
    }

    /// Mean retail trade value per step, before the 0.5x-1.5x jitter
    pub fn retail_volume_per_step(&self) -> f64 {
        self.pool.initial_wealth * self.sim.daily_volume_pct / f64::from(self.sim.steps_per_day)
    }
}

/// Convenience function to load and validate configuration
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let config = SimulationConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_validation() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_steps(), 8760);
        assert!((config.retail_volume_per_step() - 10_000_000.0 * 0.05 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("sim.toml");

        let config_content = r#"
[pool]
fee_tier = 0.0004

[dynamic_amp]
a_max = 800.0

[curve]
recenter = true

[sim]
days = 30
curve_variant = "curve_crypto"
uniswap_variant = "uniswap_std"
seed = 42

[arbitrage]
mode = "100"
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = SimulationConfig::load(Some(&config_path)).unwrap();

        assert_eq!(config.pool.fee_tier, 0.0004);
        assert_eq!(config.pool.initial_wealth, defaults::pool::INITIAL_WEALTH);
        assert_eq!(config.dynamic_amp.a_max, 800.0);
        assert_eq!(config.dynamic_amp.a_min, defaults::dynamic_amp::A_MIN);
        assert!(config.curve.recenter);
        assert_eq!(config.sim.days, 30);
        assert_eq!(config.sim.curve_variant, CurveVariant::CurveCrypto);
        assert_eq!(config.sim.uniswap_variant, UniswapVariant::UniswapStd);
        assert_eq!(config.sim.seed, Some(42));
        assert_eq!(config.arbitrage.mode, ArbitrageMode::Efficient);
    }

    #[test]
    fn test_environment_overrides_arbitrage_mode() {
        // Prefix unique to this test so parallel loads never see these vars
        let prefix = "FXSIMENVMODE";
        std::env::set_var("FXSIMENVMODE_ARBITRAGE__MODE", "100");
        std::env::set_var("FXSIMENVMODE_POOL__FEE_TIER", "0.0004");
        std::env::set_var("FXSIMENVMODE_SIM__CURVE_VARIANT", "curve_stable");

        let config = SimulationConfig::load_with_prefix(None, prefix).unwrap();
        assert_eq!(config.arbitrage.mode, ArbitrageMode::Efficient);
        assert_eq!(config.pool.fee_tier, 0.0004);
        assert_eq!(config.sim.curve_variant, CurveVariant::CurveStable);

        std::env::set_var("FXSIMENVMODE_ARBITRAGE__MODE", "50");
        let config = SimulationConfig::load_with_prefix(None, prefix).unwrap();
        assert_eq!(config.arbitrage.mode, ArbitrageMode::Passive);

        std::env::set_var("FXSIMENVMODE_ARBITRAGE__MODE", "75");
        assert!(SimulationConfig::load_with_prefix(None, prefix).is_err());

        for key in ["ARBITRAGE__MODE", "POOL__FEE_TIER", "SIM__CURVE_VARIANT"] {
            std::env::remove_var(format!("{}_{}", prefix, key));
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(SimulationConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("curve_stable".parse::<CurveVariant>().unwrap(), CurveVariant::CurveStable);
        assert_eq!("uniswap_std".parse::<UniswapVariant>().unwrap(), UniswapVariant::UniswapStd);
        assert!("curve_v3".parse::<CurveVariant>().is_err());
        assert_eq!(CurveVariant::CurveCrypto.to_string(), "curve_crypto");
    }

    #[test]
    fn test_schedule_overrides() {
        let mut arbitrage = ArbitrageConfig::default();
        assert_eq!(arbitrage.schedule(), ArbitrageSchedule::new(3, 0.5));

        arbitrage.max_passes = Some(5);
        arbitrage.convergence_factor = Some(0.4);
        assert_eq!(arbitrage.schedule(), ArbitrageSchedule::new(5, 0.4));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut config = SimulationConfig::default();
        config.dynamic_amp.a_min = 600.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.pool.fee_tier = 1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.sim.steps_per_day = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.curve.repeg_alpha = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let mut config = SimulationConfig::default();
        config.sim.seed = Some(7);
        config.arbitrage.mode = ArbitrageMode::Passive;

        let json_path = dir.path().join("sim.json");
        config.save_to_file(&json_path).unwrap();
        assert_eq!(SimulationConfig::from_file(&json_path).unwrap(), config);

        let toml_path = dir.path().join("sim.toml");
        config.save_to_file(&toml_path).unwrap();
        assert_eq!(SimulationConfig::load(Some(&toml_path)).unwrap(), config);
    }
}

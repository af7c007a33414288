//! Per-model statistics collected by the driver

use crate::price_path::PricePoint;
use amm::{PoolKind, Reserves};
use serde::{Deserialize, Serialize};

/// Observation of one model at one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub day: u64,
    pub reference_price: f64,
    /// Pool value in asset A units
    pub valuation: f64,
    pub reserves: Reserves,
    /// Value of the opening reserves had they been held instead
    pub hold_value: f64,
    /// Impermanent loss in percent (negative when the pool lags holding)
    pub il_pct: f64,
    /// Fees accrued up to and including this step
    pub cumulative_fees: f64,
    /// Amplification the pool last quoted with, if it has one
    pub amplification: Option<f64>,
    /// Retail trade was rejected this step
    pub halted: bool,
}

impl StepRecord {
    /// Asset-B share of the valuation, in asset A units
    pub fn asset_b_value(&self) -> f64 {
        self.valuation - self.reserves.reserve_a
    }
}

/// Running totals and history for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub name: String,
    pub kind: PoolKind,
    /// Retail and arbitrage fees, asset A units
    pub fees: f64,
    /// Retail and arbitrage volume, asset A units
    pub volume: f64,
    /// Portion of `volume` that came from arbitrage passes
    pub arbitrage_volume: f64,
    pub arbitrage_passes: u64,
    /// Rejected retail trades
    pub halt_count: u64,
    /// Swaps the pool itself rejected, arbitrage passes included
    pub pool_rejections: u64,
    pub history: Vec<StepRecord>,
}

impl ModelStats {
    pub fn new(name: &str, kind: PoolKind, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            kind,
            fees: 0.0,
            volume: 0.0,
            arbitrage_volume: 0.0,
            arbitrage_passes: 0,
            halt_count: 0,
            pool_rejections: 0,
            history: Vec::with_capacity(capacity),
        }
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.history.last()
    }
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub stats: Vec<ModelStats>,
    /// The input reference path, unmodified
    pub path: Vec<PricePoint>,
}

impl SimulationResult {
    pub fn model(&self, name: &str) -> Option<&ModelStats> {
        self.stats.iter().find(|stats| stats.name == name)
    }
}

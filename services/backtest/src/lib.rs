//! # FX AMM Backtest Service
//!
//! ## Purpose
//!
//! Replays a reference FX rate against competing pool designs and records
//! how each one fares: valuation against buy-and-hold, fees earned from
//! retail and arbitrage flow, and how often the dynamic pool refused to
//! trade.
//!
//! ## Integration Points
//!
//! - **Input Sources**: [`sim_config::SimulationConfig`] plus a
//!   [`price_path::PriceSource`] (synthetic GBM or historical daily CSV)
//! - **Output Destinations**: [`stats::SimulationResult`] for rendering,
//!   stdout tables and JSON exports via [`report`]
//! - **Pool Math**: Delegated entirely to the `amm` crate
//!
//! ## Architecture Role
//!
//! ```text
//! PriceSource → [Simulator] → per step, per model:
//!                   update_reference → ArbitrageEngine → retail swap → StepRecord
//!                                                                          ↓
//!                                                         SimulationResult → report
//! ```

pub mod engine;
pub mod logging;
pub mod models;
pub mod price_path;
pub mod report;
pub mod stats;

pub use engine::Simulator;
pub use price_path::{GbmPath, HistoricalPath, PricePathError, PricePoint, PriceSource};
pub use report::{render_table, summarize, write_json, ModelSummary};
pub use stats::{ModelStats, SimulationResult, StepRecord};

//! Run summaries and export

use crate::log_success;
use crate::stats::{ModelStats, SimulationResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Headline numbers for one model at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub final_valuation: f64,
    pub final_il_pct: f64,
    pub fees: f64,
    pub volume: f64,
    pub halt_count: u64,
    /// Fees as a percentage of starting wealth
    pub fee_yield_pct: f64,
    /// Asset A reserves, asset A units
    pub asset_a_value: f64,
    /// Asset B reserves valued at the final reference, asset A units
    pub asset_b_value: f64,
}

impl ModelSummary {
    /// `None` when the model recorded no steps
    pub fn from_stats(stats: &ModelStats, initial_wealth: f64) -> Option<Self> {
        let last = stats.last()?;
        Some(Self {
            name: stats.name.clone(),
            final_valuation: last.valuation,
            final_il_pct: last.il_pct,
            fees: stats.fees,
            volume: stats.volume,
            halt_count: stats.halt_count,
            fee_yield_pct: stats.fees / initial_wealth * 100.0,
            asset_a_value: last.reserves.reserve_a,
            asset_b_value: last.asset_b_value(),
        })
    }
}

pub fn summarize(result: &SimulationResult, initial_wealth: f64) -> Vec<ModelSummary> {
    result
        .stats
        .iter()
        .filter_map(|stats| ModelSummary::from_stats(stats, initial_wealth))
        .collect()
}

/// Fixed-width comparison table
pub fn render_table(summaries: &[ModelSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>16} {:>9} {:>14} {:>18} {:>8} {:>10} {:>7}",
        "Model", "Valuation", "IL %", "Fees", "Volume", "Halts", "Yield %", "A/B %"
    );
    let _ = writeln!(out, "{}", "-".repeat(113));

    for summary in summaries {
        let share_a = if summary.final_valuation > 0.0 {
            summary.asset_a_value / summary.final_valuation * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "{:<24} {:>16.2} {:>9.4} {:>14.2} {:>18.2} {:>8} {:>10.4} {:>3.0}/{:<3.0}",
            summary.name,
            summary.final_valuation,
            summary.final_il_pct,
            summary.fees,
            summary.volume,
            summary.halt_count,
            summary.fee_yield_pct,
            share_a,
            100.0 - share_a
        );
    }

    out
}

#[derive(Serialize)]
struct Export<'a> {
    summary: &'a [ModelSummary],
    #[serde(flatten)]
    result: &'a SimulationResult,
}

/// Write the summaries and full result (histories and path) as JSON
pub fn write_json(path: &Path, result: &SimulationResult, summaries: &[ModelSummary]) -> Result<()> {
    let export = Export {
        summary: summaries,
        result,
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &export)
        .with_context(|| format!("Failed to write report {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush report {:?}", path))?;

    log_success!("Report written to {:?}", path);
    Ok(())
}

//! Simulation driver
//!
//! Advances every model through the reference path in lockstep. For each
//! price sample and each model, in fixed order: push the new reference into
//! the pool hooks, let arbitrage close the gap to the pool's target, send one
//! random retail trade, then value the pool against a buy-and-hold baseline.
//!
//! All randomness (retail size and direction, stable-peg wobble, and any
//! generated price path) comes from one seedable RNG owned by the driver, so
//! a seed reproduces a run exactly.

use crate::models::build_models;
use crate::price_path::{PricePoint, PriceSource};
use crate::stats::{ModelStats, SimulationResult, StepRecord};
use crate::{log_execution, log_halt, log_success};
use amm::{ArbitrageEngine, MarketMakerModel, SwapDirection};
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sim_config::SimulationConfig;
use tracing::debug;

/// Retail trade size is the per-step mean scaled by a draw from this range
const RETAIL_JITTER_MIN: f64 = 0.5;

/// Orchestrates one backtest run
pub struct Simulator {
    config: SimulationConfig,
    arbitrage: ArbitrageEngine,
    rng: StdRng,
}

impl Simulator {
    /// Seeded from `config.sim.seed`, or from OS entropy when unset
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.sim.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: SimulationConfig, rng: StdRng) -> Self {
        let arbitrage = config.arbitrage.engine();
        Self {
            config,
            arbitrage,
            rng,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Draw a path from `source` with the run's RNG, then simulate it
    pub fn run_source(&mut self, source: &dyn PriceSource) -> Result<SimulationResult> {
        let path = source
            .generate(&mut self.rng)
            .context("Failed to generate reference price path")?;
        self.run(&path)
    }

    /// Simulate every model over `path`
    ///
    /// Pools and the buy-and-hold baseline open at the path's first price,
    /// falling back to `sim.initial_price` for an empty path.
    pub fn run(&mut self, path: &[PricePoint]) -> Result<SimulationResult> {
        let opening_price = path
            .first()
            .map_or(self.config.sim.initial_price, |point| point.price);
        if opening_price != self.config.sim.initial_price {
            debug!(
                opening_price,
                configured = self.config.sim.initial_price,
                "Opening pools at the path's first price"
            );
        }

        let mut models = build_models(&self.config, opening_price);
        let initial_reserves: Vec<_> = models.iter().map(|model| model.reserves()).collect();
        let mut stats: Vec<ModelStats> = models
            .iter()
            .map(|model| ModelStats::new(model.name(), model.kind(), path.len()))
            .collect();

        log_execution!(
            "Starting backtest: {} steps, {} models, arbitrage mode {}",
            path.len(),
            models.len(),
            self.config.arbitrage.mode
        );

        for point in path {
            if !(point.price.is_finite() && point.price > 0.0) {
                bail!(
                    "Reference price at step {} must be positive, got {}",
                    point.step,
                    point.price
                );
            }

            for ((model, stat), opening) in models
                .iter_mut()
                .zip(stats.iter_mut())
                .zip(initial_reserves.iter())
            {
                let record = self
                    .advance(model.as_mut(), stat, point)
                    .with_context(|| {
                        format!("Model '{}' failed at step {}", stat.name, point.step)
                    })?;

                let hold_value = model.value_of(*opening, point.price);
                let record = StepRecord {
                    hold_value,
                    il_pct: (record.valuation / hold_value - 1.0) * 100.0,
                    ..record
                };
                stat.history.push(record);
            }
        }

        for (model, stat) in models.iter().zip(stats.iter_mut()) {
            stat.pool_rejections = model.halt_count();
        }

        for stat in &stats {
            if let Some(last) = stat.last() {
                debug!(
                    pool = %stat.name,
                    valuation = last.valuation,
                    il_pct = last.il_pct,
                    fees = stat.fees,
                    halts = stat.halt_count,
                    "Model finished"
                );
            }
        }
        log_success!("Backtest complete: {} steps", path.len());

        Ok(SimulationResult {
            stats,
            path: path.to_vec(),
        })
    }

    /// One step for one model; hold value and IL are filled in by the caller
    fn advance(
        &mut self,
        model: &mut dyn MarketMakerModel,
        stat: &mut ModelStats,
        point: &PricePoint,
    ) -> Result<StepRecord> {
        let price = point.price;
        let fee_tier = self.config.pool.fee_tier;

        model.update_reference(price, &mut self.rng);
        model.update_internal_scale();

        let target = model.target_price(price);
        let outcome = self.arbitrage.run(model, target, fee_tier)?;
        stat.fees += outcome.fees;
        stat.volume += outcome.volume;
        stat.arbitrage_volume += outcome.volume;
        stat.arbitrage_passes += u64::from(outcome.passes);

        let trade_value = self.config.retail_volume_per_step()
            * (RETAIL_JITTER_MIN + self.rng.gen::<f64>());
        let direction = SwapDirection::from_buy_b(self.rng.gen::<f64>() > 0.5);

        let mut halted = false;
        if trade_value > 0.0 {
            let amount_in = model.input_for_value(trade_value, direction, price);
            let rejections_before = model.halt_count();
            let amount_out = model.swap(amount_in, direction)?;

            if amount_out > 0.0 {
                stat.fees += trade_value * fee_tier;
                stat.volume += trade_value;
            } else {
                halted = true;
                // Zero output without a pool-side rejection is dust, not a halt
                if model.can_halt() && model.halt_count() > rejections_before {
                    stat.halt_count += 1;
                    log_halt!(
                        "{} rejected retail trade at step {} (price {:.4})",
                        stat.name,
                        point.step,
                        price
                    );
                }
            }
        }

        Ok(StepRecord {
            step: point.step,
            day: point.day,
            reference_price: price,
            valuation: model.valuation(price),
            reserves: model.reserves(),
            hold_value: 0.0,
            il_pct: 0.0,
            cumulative_fees: stat.fees,
            amplification: model.snapshot().amplification,
            halted,
        })
    }
}

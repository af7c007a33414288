//! FX AMM Backtest
//!
//! Runs the dynamic-A pool against the selected "Curve" and "Uniswap" slot
//! designs over a synthetic or historical reference path and prints a
//! comparison table.
//!
//! Architecture:
//! Config + Price Path → THIS BINARY → stdout table (+ JSON report)

use amm::ArbitrageMode;
use amm_backtest::price_path::HOURS_PER_DAY;
use amm_backtest::{
    log_data, log_error, log_metrics, log_warning, render_table, summarize, write_json, GbmPath,
    HistoricalPath, PriceSource, Simulator,
};
use anyhow::{Context, Result};
use clap::Parser;
use sim_config::{load_config, CurveVariant, UniswapVariant};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "amm_backtest")]
#[command(about = "Backtest FX AMM pool designs against a reference rate")]
struct Args {
    /// Configuration file path (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Daily OHLC CSV to replay instead of a synthetic path
    #[arg(long)]
    historical: Option<PathBuf>,

    /// Arbitrage aggressiveness (100, 87 or 50)
    #[arg(short, long)]
    arb_mode: Option<ArbitrageMode>,

    /// Design for the Curve slot (curve_norm, curve_stable, curve_crypto)
    #[arg(long)]
    curve: Option<CurveVariant>,

    /// Design for the Uniswap slot (uniswap_v2, uniswap_std)
    #[arg(long)]
    uniswap: Option<UniswapVariant>,

    /// Length of a synthetic path in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Write the full result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("amm_backtest=info".parse()?),
        )
        .init();

    info!("🚀 FX AMM Backtest Starting");
    info!("📁 Config file: {:?}", args.config);

    if let Err(e) = run(args) {
        log_error!("Backtest failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(seed) = args.seed {
        config.sim.seed = Some(seed);
    }
    if let Some(mode) = args.arb_mode {
        config.arbitrage.mode = mode;
    }
    if let Some(curve) = args.curve {
        config.sim.curve_variant = curve;
    }
    if let Some(uniswap) = args.uniswap {
        config.sim.uniswap_variant = uniswap;
    }
    if let Some(days) = args.days {
        config.sim.days = days;
    }

    let source: Box<dyn PriceSource> = match &args.historical {
        Some(path) => {
            if config.sim.steps_per_day != HOURS_PER_DAY {
                log_warning!(
                    "Historical replay is hourly; overriding steps_per_day {} with {}",
                    config.sim.steps_per_day,
                    HOURS_PER_DAY
                );
                config.sim.steps_per_day = HOURS_PER_DAY;
            }
            let history = HistoricalPath::from_file(path)
                .with_context(|| format!("Failed to load historical data {:?}", path))?;
            log_data!("Loaded {} daily bars from {:?}", history.bars().len(), path);
            Box::new(history)
        }
        None => {
            log_data!(
                "Generating GBM path: {} days x {} steps, vol {:.2}%",
                config.sim.days,
                config.sim.steps_per_day,
                config.sim.volatility * 100.0
            );
            Box::new(GbmPath::from_config(&config))
        }
    };

    config.validate().context("Invalid configuration after CLI overrides")?;
    info!(
        seed = ?config.sim.seed,
        curve = %config.sim.curve_variant,
        uniswap = %config.sim.uniswap_variant,
        arbitrage = %config.arbitrage.mode,
        "Configuration ready"
    );

    let initial_wealth = config.pool.initial_wealth;
    let mut simulator = Simulator::new(config);
    let result = simulator.run_source(source.as_ref())?;
    let summaries = summarize(&result, initial_wealth);

    for summary in &summaries {
        log_metrics!(
            "{}: valuation {:.2}, IL {:.4}%, fees {:.2}, halts {}",
            summary.name,
            summary.final_valuation,
            summary.final_il_pct,
            summary.fees,
            summary.halt_count
        );
    }
    println!("{}", render_table(&summaries));

    if let Some(output) = &args.output {
        write_json(output, &result, &summaries)?;
    }

    Ok(())
}

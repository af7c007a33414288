//! End-to-end driver tests over synthetic and historical paths

use amm::PoolKind;
use amm_backtest::{GbmPath, HistoricalPath, PricePoint, PriceSource, Simulator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sim_config::{CurveVariant, SimulationConfig, UniswapVariant};
use std::fs;

fn config_with_seed(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.sim.days = 5;
    config.sim.seed = Some(seed);
    config
}

fn path_from_prices(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(step, &price)| PricePoint {
            step: step as u64,
            day: step as u64 / 24,
            price,
        })
        .collect()
}

#[test]
fn same_seed_reproduces_run() {
    let config = config_with_seed(42);
    let source = GbmPath::from_config(&config);

    let first = Simulator::new(config.clone()).run_source(&source).unwrap();
    let second = Simulator::new(config.clone()).run_source(&source).unwrap();
    assert_eq!(first, second);

    let other = Simulator::new(config_with_seed(43))
        .run_source(&source)
        .unwrap();
    assert_ne!(first.path, other.path);
}

#[test]
fn histories_follow_path_order() {
    let config = config_with_seed(7);
    let path = GbmPath::from_config(&config)
        .generate(&mut StdRng::seed_from_u64(7))
        .unwrap();

    let result = Simulator::new(config).run(&path).unwrap();

    assert_eq!(result.path, path);
    assert_eq!(result.stats.len(), 3);
    for stats in &result.stats {
        assert_eq!(stats.history.len(), path.len());
        for (record, point) in stats.history.iter().zip(&path) {
            assert_eq!(record.step, point.step);
            assert_eq!(record.day, point.day);
            assert_eq!(record.reference_price, point.price);
        }
        assert!(stats
            .history
            .windows(2)
            .all(|w| w[1].cumulative_fees >= w[0].cumulative_fees));
    }
}

#[test]
fn fees_track_volume_at_fee_tier() {
    let config = config_with_seed(3);
    let fee_tier = config.pool.fee_tier;
    let result = Simulator::new(config.clone())
        .run_source(&GbmPath::from_config(&config))
        .unwrap();

    for stats in &result.stats {
        assert!(stats.volume > 0.0, "{} saw no flow", stats.name);
        assert!(stats.arbitrage_volume <= stats.volume);
        assert!((stats.fees - stats.volume * fee_tier).abs() < 1e-6 * stats.volume);
        assert_eq!(stats.last().unwrap().cumulative_fees, stats.fees);
    }
}

#[test]
fn impermanent_loss_starts_near_zero() {
    let config = config_with_seed(5);
    let result = Simulator::new(config.clone())
        .run_source(&GbmPath::from_config(&config))
        .unwrap();

    for stats in &result.stats {
        let first = &stats.history[0];
        assert!(first.il_pct.abs() < 0.01, "{} il {}", stats.name, first.il_pct);
        assert!((first.hold_value - config.pool.initial_wealth).abs() < 1e-6);
    }
}

#[test]
fn dynamic_pool_halts_after_price_gap() {
    let config = config_with_seed(9);
    let path = path_from_prices(&[1400.0, 1470.0, 1470.0, 1470.0]);

    let result = Simulator::new(config).run(&path).unwrap();

    let dynamic = &result.stats[0];
    assert_eq!(dynamic.kind, PoolKind::DynamicStableSwap);
    assert!(!dynamic.history[0].halted);
    assert!(dynamic.history[1..].iter().all(|r| r.halted));
    assert_eq!(dynamic.halt_count, 3);
    // One rejected arbitrage attempt and one rejected retail trade per gapped step
    assert_eq!(dynamic.pool_rejections, 6);
    // Rejected swaps leave reserves where the opening step put them
    assert_eq!(dynamic.history[1].reserves, dynamic.history[3].reserves);

    for stats in &result.stats[1..] {
        assert_eq!(stats.halt_count, 0);
        assert_eq!(stats.pool_rejections, 0);
        assert!(stats.history.iter().all(|r| !r.halted));
        assert!(stats.arbitrage_passes > 0);
    }
}

#[test]
fn stable_peg_variant_values_at_par() {
    let mut config = config_with_seed(21);
    config.sim.curve_variant = CurveVariant::CurveStable;
    config.sim.uniswap_variant = UniswapVariant::UniswapStd;
    let wealth = config.pool.initial_wealth;

    let result = Simulator::new(config.clone())
        .run_source(&GbmPath::from_config(&config))
        .unwrap();

    let stable = result.model("Curve (USDT/USDC)").unwrap();
    assert_eq!(stable.kind, PoolKind::StablePeg);
    for record in &stable.history {
        assert_eq!(record.hold_value, wealth);
        assert!((record.valuation / wealth - 1.0).abs() < 0.01);
    }
    assert!(result.model("Uniswap V2 (Standard)").is_some());
}

#[test]
fn repricing_variant_runs_full_path() {
    let mut config = config_with_seed(13);
    config.sim.curve_variant = CurveVariant::CurveCrypto;

    let result = Simulator::new(config.clone())
        .run_source(&GbmPath::from_config(&config))
        .unwrap();

    let repricing = result.model("Curve (Crypto V2)").unwrap();
    assert_eq!(repricing.history.len(), result.path.len());
    assert!(repricing
        .history
        .iter()
        .all(|r| r.valuation.is_finite() && r.valuation > 0.0));
}

const USDKRW_CSV: &str = "Date,Open,High,Low,Close,Volume\n\
     2025-01-02,1473.38,1476.08,1462.74,1473.52,0\n\
     2025-01-03,1470.00,1472.50,1465.10,1468.90,0\n\
     2025-01-06,1466.20,1470.00,1458.40,1461.00,0\n";

#[test]
fn historical_csv_replay() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("usdkrw.csv");
    fs::write(&csv_path, USDKRW_CSV).unwrap();

    let config = config_with_seed(1);
    let history = HistoricalPath::from_file(&csv_path).unwrap();

    let result = Simulator::new(config).run_source(&history).unwrap();

    // Jan 4 and 5 are filled from the Jan 3 close
    assert_eq!(result.path.len(), 5 * 24);
    assert_eq!(result.path[0].price, 1473.38);
    assert_eq!(result.path.last().unwrap().day, 4);
    assert!(result.stats.iter().all(|s| s.history.len() == 120));
}

#[test]
fn historical_replay_opens_pools_at_first_price() {
    // Configured opening price is far from the market the file replays
    let config = config_with_seed(2);
    assert_eq!(config.sim.initial_price, 1400.0);
    let history = HistoricalPath::from_csv_str(USDKRW_CSV).unwrap();

    let result = Simulator::new(config).run_source(&history).unwrap();

    for stats in &result.stats {
        let first = &stats.history[0];
        assert!(first.il_pct.abs() < 0.01, "{} il {}", stats.name, first.il_pct);
    }
    let dynamic = &result.stats[0];
    assert_eq!(dynamic.kind, PoolKind::DynamicStableSwap);
    assert_eq!(dynamic.halt_count, 0);
    assert!(dynamic.history.iter().all(|r| !r.halted));
}

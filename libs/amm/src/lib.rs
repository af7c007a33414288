//! # FX AMM Library - Pool Mathematics and Arbitrage Engine
//!
//! ## Purpose
//!
//! Mathematical core for backtesting automated market makers on an FX pair.
//! Implements the closed-form constant product curve, a Newton's-method
//! solver for the two-coin StableSwap invariant, deviation-driven
//! amplification decay, five competing pool designs and the arbitrage flow
//! that keeps them anchored to an external reference price.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reference prices and trade requests from the backtest driver
//! - **Output Destinations**: Swap outputs, valuations and pool snapshots for statistics
//! - **Pool Designs**: Constant product, fixed-A StableSwap, dynamic-A StableSwap,
//!   repricing (CryptoSwap style), stable-peg
//! - **Precision**: `f64` throughout; solver convergence is reported, not assumed
//! - **Randomness**: Only through an injected `RngCore`, never ambient
//!
//! ## Architecture Role
//!
//! ```text
//! Reference Price → [Pool Hooks] → [ArbitrageEngine] → [Pool::swap] → Reserves
//!                        ↓                                  ↓
//!                 AmplificationPolicy              StableSwapMath / CpmmMath
//! ```
//!
//! Every pool implements [`MarketMakerModel`]; the driver and the arbitrage
//! engine only ever see that trait.

pub mod amplification;
pub mod arbitrage;
pub mod cpmm_math;
pub mod error;
pub mod pool_traits;
pub mod pools;
pub mod stableswap_math;

pub use amplification::{compute_effective_amplification, AmplificationPolicy, EffectiveAmplification};
pub use arbitrage::{ArbitrageEngine, ArbitrageMode, ArbitrageOutcome, ArbitrageSchedule, StopReason};
pub use cpmm_math::CpmmMath;
pub use error::{AmmError, AmmResult};
pub use pool_traits::{MarketMakerModel, ModelState, PoolKind, Reserves, SwapDirection};
pub use pools::{ConstantProductPool, DynamicAmpPool, RepricingPool, StablePegPool, StableSwapPool};
pub use stableswap_math::{Convergence, StableSwapMath};

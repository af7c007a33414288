//! Reference price paths
//!
//! The driver consumes an ordered `{step, day, price}` sequence and never
//! cares where it came from. Two sources are provided: a geometric Brownian
//! motion generator and a loader that expands daily OHLC bars from a CSV
//! file into hourly points.

use chrono::{Duration, NaiveDate};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hourly resolution used when expanding daily bars
pub const HOURS_PER_DAY: u32 = 24;

/// Interpolation noise as a fraction of the day's high-low range
const INTRADAY_NOISE: f64 = 0.05;

/// One sample of the external reference rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub step: u64,
    pub day: u64,
    /// Units of asset B per unit of asset A
    pub price: f64,
}

#[derive(Debug, Error)]
pub enum PricePathError {
    #[error("Failed to read price file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: invalid date '{value}'")]
    InvalidDate { line: usize, value: String },

    #[error("Line {line}: invalid {field} value '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: {reason}")]
    InvalidBar { line: usize, reason: String },

    #[error("Price file contains no usable rows")]
    Empty,

    #[error("Invalid path parameter: {0}")]
    InvalidParameter(String),
}

/// Anything that can produce a reference price sequence
pub trait PriceSource {
    fn generate(&self, rng: &mut dyn RngCore) -> Result<Vec<PricePoint>, PricePathError>;
}

/// Standard normal draw via Box-Muller
fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    // (0, 1] keeps the logarithm finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Geometric Brownian motion path with annualized parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GbmPath {
    pub days: u32,
    pub steps_per_day: u32,
    pub initial_price: f64,
    pub volatility: f64,
    pub drift: f64,
}

impl GbmPath {
    pub fn new(
        days: u32,
        steps_per_day: u32,
        initial_price: f64,
        volatility: f64,
        drift: f64,
    ) -> Self {
        Self {
            days,
            steps_per_day,
            initial_price,
            volatility,
            drift,
        }
    }

    pub fn from_config(config: &sim_config::SimulationConfig) -> Self {
        Self::new(
            config.sim.days,
            config.sim.steps_per_day,
            config.sim.initial_price,
            config.sim.volatility,
            config.sim.drift,
        )
    }
}

impl PriceSource for GbmPath {
    /// `days * steps_per_day + 1` points, the first at `initial_price`
    fn generate(&self, rng: &mut dyn RngCore) -> Result<Vec<PricePoint>, PricePathError> {
        if self.steps_per_day == 0 {
            return Err(PricePathError::InvalidParameter(
                "steps_per_day must be positive".to_string(),
            ));
        }
        if !(self.initial_price > 0.0) {
            return Err(PricePathError::InvalidParameter(format!(
                "initial_price must be positive, got {}",
                self.initial_price
            )));
        }

        let total_steps = u64::from(self.days) * u64::from(self.steps_per_day);
        let steps_per_day = u64::from(self.steps_per_day);
        let dt = 1.0 / (365.0 * f64::from(self.steps_per_day));
        let drift_term = (self.drift - 0.5 * self.volatility * self.volatility) * dt;
        let diffusion = self.volatility * dt.sqrt();

        let mut path = Vec::with_capacity(total_steps as usize + 1);
        let mut price = self.initial_price;

        for step in 0..=total_steps {
            path.push(PricePoint {
                step,
                day: step / steps_per_day,
                price,
            });
            price *= (drift_term + diffusion * standard_normal(rng)).exp();
        }

        Ok(path)
    }
}

/// One daily OHLC bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyBar {
    /// Flat bar carrying a previous close across a market holiday
    fn flat(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }
}

/// Daily bars from a `date,open,high,low,close[,volume]` CSV, expanded hourly
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalPath {
    bars: Vec<DailyBar>,
}

impl HistoricalPath {
    pub fn from_file(path: &Path) -> Result<Self, PricePathError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PricePathError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_str(&contents)
    }

    /// Parse CSV text; the first line is a header and rows with fewer than
    /// five columns are skipped
    pub fn from_csv_str(contents: &str) -> Result<Self, PricePathError> {
        let mut bars = Vec::new();

        for (index, raw) in contents.trim().lines().enumerate().skip(1) {
            let line = index + 1;
            let row: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
            if row.len() < 5 {
                continue;
            }

            let date = NaiveDate::parse_from_str(row[0], "%Y-%m-%d").map_err(|_| {
                PricePathError::InvalidDate {
                    line,
                    value: row[0].to_string(),
                }
            })?;
            let field = |position: usize, name: &'static str| -> Result<f64, PricePathError> {
                row[position]
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() && *value > 0.0)
                    .ok_or_else(|| PricePathError::InvalidNumber {
                        line,
                        field: name,
                        value: row[position].to_string(),
                    })
            };

            let bar = DailyBar {
                date,
                open: field(1, "open")?,
                high: field(2, "high")?,
                low: field(3, "low")?,
                close: field(4, "close")?,
            };
            if bar.high < bar.low {
                return Err(PricePathError::InvalidBar {
                    line,
                    reason: format!("high {} below low {}", bar.high, bar.low),
                });
            }
            bars.push(bar);
        }

        if bars.is_empty() {
            return Err(PricePathError::Empty);
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    /// Insert flat bars at the previous close for every skipped calendar day
    pub fn filled_bars(&self) -> Vec<DailyBar> {
        let mut filled = Vec::with_capacity(self.bars.len());

        for (current, next) in self.bars.iter().zip(self.bars.iter().skip(1)) {
            filled.push(*current);
            let mut date = current.date + Duration::days(1);
            while date < next.date {
                filled.push(DailyBar::flat(date, current.close));
                date += Duration::days(1);
            }
        }
        if let Some(last) = self.bars.last() {
            filled.push(*last);
        }

        filled
    }
}

/// Expand one bar into hourly prices
///
/// Open is pinned at hour 0 and close at hour 23; high and low land on
/// distinct random hours in `1..=22`. Hours between anchors are linearly
/// interpolated with a little noise and clamped to the bar's range.
fn expand_bar(bar: &DailyBar, rng: &mut dyn RngCore) -> Vec<f64> {
    let mut high_hour: u32 = rng.gen_range(1..=22);
    let low_hour: u32 = rng.gen_range(1..=22);
    if high_hour == low_hour {
        if high_hour < 12 {
            high_hour += 1;
        } else {
            high_hour -= 1;
        }
    }

    let mut anchors = [
        (0, bar.open),
        (HOURS_PER_DAY - 1, bar.close),
        (high_hour, bar.high),
        (low_hour, bar.low),
    ];
    anchors.sort_by_key(|(hour, _)| *hour);

    let range = bar.high - bar.low;
    (0..HOURS_PER_DAY)
        .map(|hour| {
            let segment = anchors
                .windows(2)
                .find(|pair| hour >= pair[0].0 && hour <= pair[1].0);

            let price = match segment {
                Some(pair) => {
                    let (start_hour, start_price) = pair[0];
                    let (end_hour, end_price) = pair[1];
                    if hour == start_hour {
                        start_price
                    } else if hour == end_hour {
                        end_price
                    } else {
                        let ratio =
                            f64::from(hour - start_hour) / f64::from(end_hour - start_hour);
                        let noise = (rng.gen::<f64>() - 0.5) * range * INTRADAY_NOISE;
                        start_price + (end_price - start_price) * ratio + noise
                    }
                }
                None => bar.close,
            };

            price.min(bar.high).max(bar.low)
        })
        .collect()
}

impl PriceSource for HistoricalPath {
    /// 24 points per filled day; `day` is the sequential bar index
    fn generate(&self, rng: &mut dyn RngCore) -> Result<Vec<PricePoint>, PricePathError> {
        let filled = self.filled_bars();
        let mut path = Vec::with_capacity(filled.len() * HOURS_PER_DAY as usize);
        let mut step = 0u64;

        for (day, bar) in filled.iter().enumerate() {
            for price in expand_bar(bar, rng) {
                path.push(PricePoint {
                    step,
                    day: day as u64,
                    price,
                });
                step += 1;
            }
        }

        Ok(path)
    }
}

//! Relative strength of a stock against a benchmark
//!
//! Both close series are inner-joined by date, rebased so the first merged
//! point is 100, and differenced into the RS line. An OLS line through the RS
//! line (against its 0-based position) gives the trend; points deviating from
//! it by more than the break threshold are reported as breaks.
//!
//! ```rust
//! use chrono::{Days, NaiveDate};
//! use sigscope::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = |growth: f64| -> Vec<ClosePoint> {
//!     (0..20u64)
//!         .map(|i| ClosePoint::new(start + Days::new(i), 50.0 * (1.0 + growth * i as f64)))
//!         .collect()
//! };
//!
//! let rs = analyze_relative_strength(&series(0.02), &series(0.01)).unwrap();
//! assert_eq!(rs.points[0].stock_normalized, 100.0);
//! assert!(rs.trend.slope > 0.0);
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{config::RelativeStrengthConfig, ClosePoint, Result};

// ============================================================
// TYPES
// ============================================================

/// One merged trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RsPoint {
    pub date: NaiveDate,
    pub stock_price: f64,
    pub benchmark_price: f64,
    pub stock_normalized: f64,
    pub benchmark_normalized: f64,
    /// `stock_normalized - benchmark_normalized`
    pub rs_line: f64,
}

/// OLS line `rs_line = slope * index + intercept`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
}

impl TrendModel {
    /// Fit against positions `0..values.len()`.
    ///
    /// Fewer than two values, or any non-finite value, give the zero model;
    /// a constant series gives `r2 = 0`.
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len();
        if n < 2 || values.iter().any(|v| !v.is_finite()) {
            return Self::default();
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n as f64;

        let (numerator, denominator) =
            values
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(num, den), (i, &y)| {
                    let dx = i as f64 - x_mean;
                    (num + dx * (y - y_mean), den + dx * dx)
                });

        let slope = if denominator != 0.0 {
            numerator / denominator
        } else {
            0.0
        };
        let intercept = y_mean - slope * x_mean;

        let (ss_total, ss_residual) =
            values
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(tot, res), (i, &y)| {
                    let predicted = slope * i as f64 + intercept;
                    (tot + (y - y_mean).powi(2), res + (y - predicted).powi(2))
                });

        let r2 = if ss_total != 0.0 {
            1.0 - ss_residual / ss_total
        } else {
            0.0
        };

        if !(slope.is_finite() && intercept.is_finite() && r2.is_finite()) {
            return Self::default();
        }

        Self {
            slope,
            intercept,
            r2,
        }
    }

    #[inline]
    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakDirection {
    Breakup,
    Breakdown,
}

/// A point whose RS value strays from the trend by more than the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendBreak {
    pub index: usize,
    pub direction: BreakDirection,
    /// |actual - predicted|
    pub strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    /// Outperforming the benchmark lately
    Up,
    Down,
}

/// Direction of the RS line over the trailing window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecentTrend {
    pub direction: TrendDirection,
    pub strength: f64,
}

/// Full relative-strength analysis of one stock
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelativeStrength {
    pub points: Vec<RsPoint>,
    pub trend: TrendModel,
    pub breaks: Vec<TrendBreak>,
    pub recent_trend: Option<RecentTrend>,
}

// ============================================================
// ANALYZER
// ============================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeStrengthAnalyzer {
    config: RelativeStrengthConfig,
}

impl RelativeStrengthAnalyzer {
    pub fn new(config: RelativeStrengthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RelativeStrengthConfig {
        &self.config
    }

    /// Merge, rebase, fit and flag breaks.
    ///
    /// Stock order is preserved; stock dates missing from the benchmark are
    /// dropped, as are days where either close is zero. An empty merge is an
    /// empty result, not an error.
    pub fn analyze(&self, stock: &[ClosePoint], benchmark: &[ClosePoint]) -> Result<RelativeStrength> {
        ClosePoint::validate_series(stock)?;
        ClosePoint::validate_series(benchmark)?;

        let points = merge(stock, benchmark);
        if points.is_empty() {
            debug!(stock = stock.len(), benchmark = benchmark.len(), "no overlapping dates");
            return Ok(RelativeStrength::default());
        }

        let (trend, breaks) = if points.len() >= self.config.min_trend_points.get() {
            let rs_line: Vec<f64> = points.iter().map(|p| p.rs_line).collect();
            let trend = TrendModel::fit(&rs_line);
            let breaks = detect_breaks(&rs_line, &trend, self.config.break_threshold.get());
            (trend, breaks)
        } else {
            (TrendModel::default(), Vec::new())
        };

        let recent_trend = recent_trend(&points, self.config.recent_window.get());

        debug!(
            points = points.len(),
            slope = trend.slope,
            r2 = trend.r2,
            breaks = breaks.len(),
            "relative strength analyzed"
        );

        Ok(RelativeStrength {
            points,
            trend,
            breaks,
            recent_trend,
        })
    }
}

/// Analyze with the default configuration (break threshold 3).
pub fn analyze_relative_strength(
    stock: &[ClosePoint],
    benchmark: &[ClosePoint],
) -> Result<RelativeStrength> {
    RelativeStrengthAnalyzer::default().analyze(stock, benchmark)
}

// ============================================================
// Internal helpers
// ============================================================

fn merge(stock: &[ClosePoint], benchmark: &[ClosePoint]) -> Vec<RsPoint> {
    let benchmark_by_date: HashMap<NaiveDate, f64> =
        benchmark.iter().map(|p| (p.date, p.close)).collect();

    let joined: Vec<(NaiveDate, f64, f64)> = stock
        .iter()
        .filter_map(|p| {
            let benchmark_price = *benchmark_by_date.get(&p.date)?;
            (p.close > 0.0 && benchmark_price > 0.0).then_some((p.date, p.close, benchmark_price))
        })
        .collect();

    let Some(&(_, stock_base, benchmark_base)) = joined.first() else {
        return Vec::new();
    };

    joined
        .into_iter()
        .filter_map(|(date, stock_price, benchmark_price)| {
            let stock_normalized = stock_price / stock_base * 100.0;
            let benchmark_normalized = benchmark_price / benchmark_base * 100.0;
            let rs_line = stock_normalized - benchmark_normalized;
            // rebasing off a tiny base can overflow
            if !rs_line.is_finite() {
                trace!(%date, stock_price, benchmark_price, "dropping unrebaseable point");
                return None;
            }
            Some(RsPoint {
                date,
                stock_price,
                benchmark_price,
                stock_normalized,
                benchmark_normalized,
                rs_line,
            })
        })
        .collect()
}

fn detect_breaks(rs_line: &[f64], trend: &TrendModel, threshold: f64) -> Vec<TrendBreak> {
    rs_line
        .iter()
        .enumerate()
        .filter_map(|(index, &actual)| {
            let deviation = actual - trend.predict(index);
            if !deviation.is_finite() || deviation.abs() <= threshold {
                return None;
            }
            let direction = if deviation > 0.0 {
                BreakDirection::Breakup
            } else {
                BreakDirection::Breakdown
            };
            trace!(index, deviation, "trend break");
            Some(TrendBreak {
                index,
                direction,
                strength: deviation.abs(),
            })
        })
        .collect()
}

fn recent_trend(points: &[RsPoint], window: usize) -> Option<RecentTrend> {
    if points.len() < window {
        return None;
    }
    let recent = &points[points.len() - window..];
    let half = window / 2;
    let mean = |slice: &[RsPoint]| slice.iter().map(|p| p.rs_line).sum::<f64>() / slice.len() as f64;

    let start_avg = mean(&recent[..half]);
    let end_avg = mean(&recent[recent.len() - half..]);

    Some(RecentTrend {
        direction: if end_avg > start_avg {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        },
        strength: (end_avg - start_avg).abs(),
    })
}

// ============================================================
// TESTS
// ============================================================

//! Cross-sectional heatmap over a symbol universe
//!
//! Symbols at or below the liquidity floor are dropped first; they neither
//! appear in a group nor stretch the color scale. The rest are partitioned
//! by [`GroupBy`], ranked, and colored on a red to green gradient of the
//! chosen [`HeatmapMetric`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{config::HeatmapConfig, Rating, Result, SymbolMetrics};

// ============================================================
// OPTIONS
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Six letter buckets, ranked by total score
    Rating,
    /// Four buckets of 20-day performance, ranked by it
    Performance,
    /// One group of everything, ranked by total score
    #[default]
    All,
}

/// Value driving tile color and the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapMetric {
    #[default]
    Perf20d,
    Perf60d,
    #[serde(alias = "vs_smh_20d")]
    VsBenchmark20d,
    TotalScore,
    PriceChangePct,
}

impl HeatmapMetric {
    pub fn value(self, metrics: &SymbolMetrics) -> f64 {
        match self {
            Self::Perf20d => metrics.perf_20d,
            Self::Perf60d => metrics.perf_60d,
            Self::VsBenchmark20d => metrics.vs_benchmark_20d,
            Self::TotalScore => metrics.total_score,
            Self::PriceChangePct => metrics.price_change_pct,
        }
    }
}

// ============================================================
// COLOR
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Shown when every value is equal
    pub const NEUTRAL: Rgb = Rgb::new(0x33, 0x41, 0x55);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn hex(self) -> String {
        self.to_string()
    }

    fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            channel(self.r, to.r),
            channel(self.g, to.g),
            channel(self.b, to.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Interpolates `from -> to` over `(above, upper]`
struct ColorBand {
    above: f64,
    upper: f64,
    from: Rgb,
    to: Rgb,
}

const DEEP_RED: Rgb = Rgb::new(255, 40, 50);
const ORANGE_RED: Rgb = Rgb::new(250, 120, 50);
const AMBER: Rgb = Rgb::new(240, 200, 40);
const YELLOW_GREEN: Rgb = Rgb::new(190, 205, 60);
const GREEN: Rgb = Rgb::new(90, 210, 90);
const BRIGHT_GREEN: Rgb = Rgb::new(0, 255, 120);

// Descending; the last band catches n == 0.
const BANDS: [ColorBand; 6] = [
    ColorBand { above: 0.7, upper: 1.0, from: GREEN, to: BRIGHT_GREEN },
    ColorBand { above: 0.5, upper: 0.7, from: YELLOW_GREEN, to: GREEN },
    ColorBand { above: 0.3, upper: 0.5, from: AMBER, to: YELLOW_GREEN },
    ColorBand { above: 0.15, upper: 0.3, from: ORANGE_RED, to: AMBER },
    ColorBand { above: 0.0, upper: 0.15, from: DEEP_RED, to: ORANGE_RED },
    ColorBand { above: f64::NEG_INFINITY, upper: 0.0, from: DEEP_RED, to: DEEP_RED },
];

fn gradient(normalized: f64) -> Rgb {
    BANDS
        .iter()
        .find(|band| normalized > band.above)
        .map_or(DEEP_RED, |band| {
            let t = if band.above.is_finite() {
                (normalized - band.above) / (band.upper - band.above)
            } else {
                0.0
            };
            band.from.lerp(band.to, t.clamp(0.0, 1.0))
        })
}

/// Min/max of the metric over the liquid set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// `None` for an empty input.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |scale, v| {
            Some(match scale {
                None => ColorScale { min: v, max: v },
                Some(s) => ColorScale {
                    min: s.min.min(v),
                    max: s.max.max(v),
                },
            })
        })
    }

    /// Position in `[0, 1]`, `None` when the scale is flat.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        let span = self.max - self.min;
        if span == 0.0 || !span.is_finite() {
            return None;
        }
        Some(((value - self.min) / span).clamp(0.0, 1.0))
    }

    pub fn color(&self, value: f64) -> Rgb {
        self.normalize(value).map_or(Rgb::NEUTRAL, gradient)
    }
}

// ============================================================
// OUTPUT
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapTile {
    pub ticker: String,
    /// Ranking key of the grouping mode
    pub score: f64,
    /// Chosen metric
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGroup {
    pub name: String,
    /// Ranked by `score` descending
    pub members: Vec<HeatmapTile>,
    /// Mean `score` of the members
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapSummary {
    pub total: usize,
    /// Metric above zero
    pub outperforming: usize,
    pub underperforming: usize,
    pub strongest: Option<String>,
    pub weakest: Option<String>,
    /// Mean metric, 0 when empty
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Heatmap {
    pub groups: Vec<HeatmapGroup>,
    /// `None` when nothing passed the liquidity filter
    pub scale: Option<ColorScale>,
    pub summary: HeatmapSummary,
}

impl Heatmap {
    /// Tiles of all groups, in group order.
    pub fn tiles(&self) -> impl Iterator<Item = &HeatmapTile> + '_ {
        self.groups.iter().flat_map(|g| g.members.iter())
    }
}

// ============================================================
// AGGREGATOR
// ============================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct HeatmapAggregator {
    config: HeatmapConfig,
}

impl HeatmapAggregator {
    pub fn new(config: HeatmapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// Filter, partition, rank and color.
    ///
    /// Every symbol is validated before anything is computed; an empty
    /// liquid set gives an empty heatmap.
    pub fn aggregate(
        &self,
        symbols: &[SymbolMetrics],
        group_by: GroupBy,
        metric: HeatmapMetric,
    ) -> Result<Heatmap> {
        for symbol in symbols {
            symbol.validate()?;
        }

        let floor = self.config.min_dollar_volume.get();
        let liquid: Vec<&SymbolMetrics> =
            symbols.iter().filter(|s| s.dollar_volume > floor).collect();

        let scale = ColorScale::from_values(liquid.iter().map(|s| metric.value(s)));
        let tile = |s: &SymbolMetrics| {
            let value = metric.value(s);
            HeatmapTile {
                ticker: s.ticker.clone(),
                score: rank_key(group_by, s),
                value,
                color: scale.map_or(Rgb::NEUTRAL, |sc| sc.color(value)),
            }
        };

        let mut buckets: Vec<(String, Vec<HeatmapTile>)> = bucket_names(group_by)
            .into_iter()
            .map(|name| (name, Vec::new()))
            .collect();
        for symbol in &liquid {
            let slot = bucket_of(group_by, symbol);
            trace!(ticker = %symbol.ticker, bucket = %buckets[slot].0, "grouped");
            buckets[slot].1.push(tile(symbol));
        }

        let mut groups: Vec<HeatmapGroup> = buckets
            .into_iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(name, mut members)| {
                members.sort_by(|a, b| b.score.total_cmp(&a.score));
                let average = mean(members.iter().map(|t| t.score));
                HeatmapGroup {
                    name,
                    members,
                    average,
                }
            })
            .collect();
        groups.sort_by(|a, b| b.average.total_cmp(&a.average));

        let summary = summarize(&liquid, metric);

        debug!(
            input = symbols.len(),
            liquid = liquid.len(),
            groups = groups.len(),
            "heatmap aggregated"
        );

        Ok(Heatmap {
            groups,
            scale,
            summary,
        })
    }
}

/// Aggregate with the default 1M dollar-volume floor.
pub fn aggregate(
    symbols: &[SymbolMetrics],
    group_by: GroupBy,
    metric: HeatmapMetric,
) -> Result<Heatmap> {
    HeatmapAggregator::default().aggregate(symbols, group_by, metric)
}

// ============================================================
// Internal helpers
// ============================================================

const PERFORMANCE_BUCKETS: [&str; 4] = ["Strong", "Moderate", "Weak", "Very Weak"];

fn bucket_names(group_by: GroupBy) -> Vec<String> {
    match group_by {
        GroupBy::Rating => Rating::ALL
            .iter()
            .map(|r| format!("Rating {}", r.as_str()))
            .collect(),
        GroupBy::Performance => PERFORMANCE_BUCKETS.iter().map(|s| s.to_string()).collect(),
        GroupBy::All => vec!["All Stocks".to_string()],
    }
}

fn bucket_of(group_by: GroupBy, symbol: &SymbolMetrics) -> usize {
    match group_by {
        GroupBy::Rating => match symbol.rating {
            Rating::S => 0,
            Rating::A => 1,
            Rating::B => 2,
            Rating::C => 3,
            Rating::D => 4,
            Rating::F => 5,
        },
        GroupBy::Performance => {
            let perf = symbol.perf_20d;
            if perf > 10.0 {
                0
            } else if perf > 0.0 {
                1
            } else if perf > -10.0 {
                2
            } else {
                3
            }
        }
        GroupBy::All => 0,
    }
}

fn rank_key(group_by: GroupBy, symbol: &SymbolMetrics) -> f64 {
    match group_by {
        GroupBy::Performance => symbol.perf_20d,
        GroupBy::Rating | GroupBy::All => symbol.total_score,
    }
}

/// Mean of each value pre-divided by the count, so finite inputs never
/// overflow the sum. 0 when empty.
fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.map(|v| v / n as f64).sum()
}

fn summarize(liquid: &[&SymbolMetrics], metric: HeatmapMetric) -> HeatmapSummary {
    let values: Vec<(&str, f64)> = liquid
        .iter()
        .map(|s| (s.ticker.as_str(), metric.value(s)))
        .collect();
    if values.is_empty() {
        return HeatmapSummary::default();
    }

    let outperforming = values.iter().filter(|(_, v)| *v > 0.0).count();
    // first of equals wins
    let strongest = values
        .iter()
        .copied()
        .reduce(|best, x| if x.1 > best.1 { x } else { best });
    let weakest = values
        .iter()
        .copied()
        .reduce(|worst, x| if x.1 < worst.1 { x } else { worst });

    HeatmapSummary {
        total: values.len(),
        outperforming,
        underperforming: values.len() - outperforming,
        strongest: strongest.map(|(t, _)| t.to_string()),
        weakest: weakest.map(|(t, _)| t.to_string()),
        average: mean(values.iter().map(|(_, v)| *v)),
    }
}

// ============================================================
// TESTS
// ============================================================

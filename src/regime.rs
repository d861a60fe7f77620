//! Market regime from a benchmark's 200-day SMA and the VIX level
//!
//! [`RegimeAssessment::classify`] is the full read-out; [`MarketRegime`] is
//! the two-field gate consumed by [`recommend`](crate::scoring::recommend).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ClosePoint, Result, SignalError};

/// Lookback of the trend filter
pub const SMA_PERIOD: usize = 200;

const VIX_CALM: f64 = 20.0;
const VIX_ELEVATED: f64 = 25.0;
const VIX_STRESSED: f64 = 30.0;

const BULLISH_BOOST: f64 = 1.05;

/// Gate applied to bullish recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub allow_new_longs: bool,
    pub label: String,
}

impl MarketRegime {
    pub fn new(allow_new_longs: bool, label: impl Into<String>) -> Self {
        Self {
            allow_new_longs,
            label: label.into(),
        }
    }
}

impl From<&RegimeAssessment> for MarketRegime {
    fn from(assessment: &RegimeAssessment) -> Self {
        assessment.to_gate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeKind {
    Bullish,
    CautiousBull,
    VolatileBull,
    Correction,
    Bearish,
}

impl RegimeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::CautiousBull => "Cautious Bull",
            Self::VolatileBull => "Volatile Bull",
            Self::Correction => "Correction",
            Self::Bearish => "Bearish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VixLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VixLevel {
    fn of(vix: f64) -> Self {
        if vix < VIX_CALM {
            Self::Low
        } else if vix < VIX_ELEVATED {
            Self::Moderate
        } else if vix < VIX_STRESSED {
            Self::High
        } else {
            Self::Extreme
        }
    }

    pub fn position_size_multiplier(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Moderate => 0.75,
            Self::High => 0.5,
            Self::Extreme => 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeAssessment {
    pub kind: RegimeKind,
    pub benchmark_above_sma: bool,
    pub sma: f64,
    /// `(last / sma - 1) * 100`
    pub distance_to_sma_pct: f64,
    pub vix: f64,
    pub vix_level: VixLevel,
    pub allow_new_longs: bool,
    pub reduce_position_size: bool,
    pub position_size_multiplier: f64,
}

impl RegimeAssessment {
    /// Classify from benchmark closes (oldest first) and the current VIX.
    ///
    /// The SMA covers the last 200 closes, or all of them when fewer are
    /// available.
    ///
    /// ```rust
    /// use chrono::{Days, NaiveDate};
    /// use sigscope::prelude::*;
    ///
    /// let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    /// let closes: Vec<ClosePoint> = (0..250u64)
    ///     .map(|i| ClosePoint::new(start + Days::new(i), 400.0 + i as f64))
    ///     .collect();
    ///
    /// let regime = RegimeAssessment::classify(&closes, 16.0).unwrap();
    /// assert_eq!(regime.kind, RegimeKind::Bullish);
    /// assert!(regime.to_gate().allow_new_longs);
    /// ```
    pub fn classify(benchmark: &[ClosePoint], vix: f64) -> Result<Self> {
        ClosePoint::validate_series(benchmark)?;
        if !vix.is_finite() || vix < 0.0 {
            return Err(SignalError::OutOfRange {
                field: "vix",
                value: vix,
                min: 0.0,
                max: f64::MAX,
            });
        }
        let Some(last) = benchmark.last() else {
            return Err(SignalError::InvalidValue("benchmark series is empty"));
        };

        let window = &benchmark[benchmark.len().saturating_sub(SMA_PERIOD)..];
        let sma = window.iter().map(|p| p.close).sum::<f64>() / window.len() as f64;
        let above = last.close > sma;

        let kind = match (above, vix) {
            (true, v) if v < VIX_CALM => RegimeKind::Bullish,
            (true, v) if v < VIX_ELEVATED => RegimeKind::CautiousBull,
            (true, _) => RegimeKind::VolatileBull,
            (false, v) if v < VIX_ELEVATED => RegimeKind::Correction,
            (false, _) => RegimeKind::Bearish,
        };

        let distance_to_sma_pct = if sma > 0.0 {
            (last.close / sma - 1.0) * 100.0
        } else {
            0.0
        };
        let vix_level = VixLevel::of(vix);

        debug!(regime = kind.as_str(), sma, vix, "market regime classified");

        Ok(Self {
            kind,
            benchmark_above_sma: above,
            sma,
            distance_to_sma_pct,
            vix,
            vix_level,
            allow_new_longs: above && vix < VIX_ELEVATED,
            reduce_position_size: vix >= VIX_ELEVATED,
            position_size_multiplier: vix_level.position_size_multiplier(),
        })
    }

    pub fn to_gate(&self) -> MarketRegime {
        MarketRegime::new(self.allow_new_longs, self.kind.as_str())
    }

    /// Scale a 0..100 score for the regime, rounded to one decimal.
    pub fn adjust_score(&self, score: f64) -> f64 {
        let mut adjusted = score;
        if !self.allow_new_longs {
            adjusted *= self.position_size_multiplier;
        }
        if self.kind == RegimeKind::Bullish {
            adjusted = (adjusted * BULLISH_BOOST).min(100.0);
        }
        (adjusted * 10.0).round() / 10.0
    }
}

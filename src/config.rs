//! Tunable knobs of the analyzers
//!
//! Every field has a default, so a partial JSON/TOML document deserializes into
//! a complete configuration:
//!
//! ```rust
//! use sigscope::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.relative_strength.break_threshold.get(), 3.0);
//! ```
//!
//! Candlestick thresholds are deliberately absent: they are fixed constants of
//! the detectors.

use serde::{Deserialize, Serialize};

use crate::{Period, Result, SignalError, Threshold};

// ============================================================
// DEFAULTS
// ============================================================

/// RS deviation (percentage points of rebased price) that counts as a break
pub const DEFAULT_BREAK_THRESHOLD: f64 = 3.0;
/// Fewer merged points than this yields the zero trend and no breaks
pub const DEFAULT_MIN_TREND_POINTS: usize = 10;
/// Trailing points compared half against half for the recent RS direction
pub const DEFAULT_RECENT_WINDOW: usize = 10;
/// Heatmap liquidity floor: dollar volume must exceed this
pub const DEFAULT_MIN_DOLLAR_VOLUME: f64 = 1_000_000.0;

// ============================================================
// RELATIVE STRENGTH
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeStrengthConfig {
  pub break_threshold: Threshold,
  pub min_trend_points: Period,
  pub recent_window: Period,
}

impl Default for RelativeStrengthConfig {
  fn default() -> Self {
    Self {
      break_threshold: Threshold::new_const(DEFAULT_BREAK_THRESHOLD),
      min_trend_points: Period::new_const(DEFAULT_MIN_TREND_POINTS),
      recent_window: Period::new_const(DEFAULT_RECENT_WINDOW),
    }
  }
}

impl RelativeStrengthConfig {
  /// Same defaults with a different break threshold
  pub fn with_break_threshold(threshold: f64) -> Result<Self> {
    Ok(Self { break_threshold: Threshold::new(threshold)?, ..Self::default() })
  }

  pub fn validate(&self) -> Result<()> {
    let min_points = self.min_trend_points.get();
    if min_points < 2 {
      // a line through one point is undefined
      return Err(SignalError::OutOfRange {
        field: "min_trend_points",
        value: min_points as f64,
        min: 2.0,
        max: usize::MAX as f64,
      });
    }
    let window = self.recent_window.get();
    if window < 2 || window % 2 != 0 {
      return Err(SignalError::InvalidConfig(format!(
        "recent_window must be even and >= 2, got {window}"
      )));
    }
    Ok(())
  }
}

// ============================================================
// HEATMAP
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
  pub min_dollar_volume: Threshold,
}

impl Default for HeatmapConfig {
  fn default() -> Self {
    Self { min_dollar_volume: Threshold::new_const(DEFAULT_MIN_DOLLAR_VOLUME) }
  }
}

// ============================================================
// TOP LEVEL
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
  pub relative_strength: RelativeStrengthConfig,
  pub heatmap: HeatmapConfig,
}

impl AnalysisConfig {
  pub fn validate(&self) -> Result<()> {
    self.relative_strength.validate()
  }
}

// ============================================================
// TESTS
// ============================================================

//! # sigscope - technical-analysis signals for daily equity bars
//!
//! Pure, synchronous analytics over caller-owned price data:
//!
//! - [`PatternEngine`]: candlestick reversal patterns (Engulfing, Doji, Hammer,
//!   Shooting Star, Morning/Evening Star)
//! - [`relative_strength`]: stock vs. benchmark rebased to 100, OLS trend and breaks
//! - [`scoring`]: bounded risk score and a regime-gated recommendation
//! - [`heatmap`]: liquidity-filtered cross-section grouped and color encoded
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sigscope::prelude::*;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
//! let bars = vec![
//!     Candle::new(day(4), 10.0, 11.0, 9.0, 9.5, 1_000.0),
//!     Candle::new(day(5), 9.4, 11.5, 9.2, 11.0, 1_000.0),
//! ];
//!
//! let events = detect_patterns(&bars).unwrap();
//! assert_eq!(events[0].kind, PatternKind::Engulfing);
//! assert!(events[0].bullish);
//! ```
//!
//! ## Input policy
//!
//! Every entry point validates its whole input first and returns
//! [`SignalError`] on a contract violation (non-finite or negative prices,
//! `high < low`, dates out of order). An absence of signals is never an error.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

pub mod config;
pub mod detectors;
pub mod heatmap;
pub mod regime;
pub mod relative_strength;
pub mod scoring;

pub mod prelude {
    pub use crate::{
        // Configuration
        config::{AnalysisConfig, HeatmapConfig, RelativeStrengthConfig},
        // Detectors
        detectors::*,
        // Heatmap
        heatmap::{
            aggregate, ColorScale, GroupBy, Heatmap, HeatmapAggregator, HeatmapGroup,
            HeatmapMetric, HeatmapSummary, HeatmapTile, Rgb,
        },
        // Regime
        regime::{MarketRegime, RegimeAssessment, RegimeKind, VixLevel},
        // Relative strength
        relative_strength::{
            analyze_relative_strength, BreakDirection, RecentTrend, RelativeStrength,
            RelativeStrengthAnalyzer, RsPoint, TrendBreak, TrendDirection, TrendModel,
        },
        // Scoring
        scoring::{
            assess, assess_parallel, recommend, risk_score, Assessment, Recommendation,
            RecommendationLabel, RiskLevel, RiskScore,
        },
        // Parallel
        scan_parallel,
        // Iterator
        BarPatterns,
        // Engine
        BuiltinDetector,
        // Types
        Candle,
        ClosePoint,
        detect_patterns,
        // Core traits
        DynPatternDetector,
        EngineBuilder,
        OHLCVExt,
        PatternDetector,
        PatternEngine,
        PatternEvent,
        PatternIterator,
        PatternKind,
        Period,
        Rating,
        Result,
        ScanError,
        ScanResult,
        // Errors
        SignalError,
        SymbolMetrics,
        Threshold,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors raised when caller input breaks the data contract
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },

    #[error("Dates not strictly ascending at index {index}")]
    UnorderedDates { index: usize },

    #[error("Invalid metric {field} = {value} for {ticker}")]
    InvalidMetric {
        ticker: String,
        field: &'static str,
        value: f64,
    },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Non-negative, finite threshold
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Create a new Threshold, validating the value is finite and >= 0
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(SignalError::InvalidValue(
                "Threshold cannot be NaN or infinite",
            ));
        }
        if value < 0.0 {
            return Err(SignalError::OutOfRange {
                field: "Threshold",
                value,
                min: 0.0,
                max: f64::MAX,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Threshold {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Threshold {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Threshold::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SignalError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    /// Trading day, when the bar carries one. Dated series are checked for order.
    fn date(&self) -> Option<NaiveDate> {
        None
    }
}

/// Blanket impl for references to dyn OHLCV
impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> f64 {
        (*self).volume()
    }

    fn date(&self) -> Option<NaiveDate> {
        (*self).date()
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    /// Midpoint of the real body
    #[inline]
    fn body_midpoint(&self) -> f64 {
        (self.open() + self.close()) / 2.0
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "negative price or volume",
            });
        }
        if self.high() < self.low() {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        if self.high() < self.open().max(self.close()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "high below body",
            });
        }
        if self.low() > self.open().min(self.close()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "low above body",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Validate every bar and, for dated bars, strictly ascending dates.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    let mut last: Option<NaiveDate> = None;
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            SignalError::InvalidCandle { reason, .. } => {
                warn!(index = i, reason, "rejecting candle series");
                SignalError::InvalidCandle { index: i, reason }
            }
            other => other,
        })?;
        if let Some(date) = bar.date() {
            if last.is_some_and(|prev| date <= prev) {
                warn!(index = i, %date, "rejecting candle series: dates out of order");
                return Err(SignalError::UnorderedDates { index: i });
            }
            last = Some(date);
        }
    }
    Ok(())
}

// ============================================================
// DATA MODEL
// ============================================================

/// One trading day's open/high/low/close/volume
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

/// Daily close, the input of relative-strength and regime analysis
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl ClosePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }

    /// Check closes are finite, non-negative and dates strictly ascending.
    pub fn validate_series(points: &[ClosePoint]) -> Result<()> {
        for (i, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close < 0.0 {
                warn!(index = i, close = point.close, "rejecting close series");
                return Err(SignalError::InvalidCandle {
                    index: i,
                    reason: "close must be finite and >= 0",
                });
            }
            if i > 0 && point.date <= points[i - 1].date {
                warn!(index = i, date = %point.date, "rejecting close series: dates out of order");
                return Err(SignalError::UnorderedDates { index: i });
            }
        }
        Ok(())
    }
}

impl From<&Candle> for ClosePoint {
    fn from(candle: &Candle) -> Self {
        Self {
            date: candle.date,
            close: candle.close,
        }
    }
}

/// Letter rating assigned upstream; anything unrecognised lands in `F`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Rating {
    S,
    A,
    B,
    C,
    D,
    #[default]
    #[serde(other)]
    F,
}

impl Rating {
    pub const ALL: [Rating; 6] = [Rating::S, Rating::A, Rating::B, Rating::C, Rating::D, Rating::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::S => "S",
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
            Rating::F => "F",
        }
    }
}

/// Per-symbol facts computed by the data provider.
///
/// Performance fields are percentages, `max_drawdown` is negative for a loss.
/// Field names follow the provider's JSON; the `vs_smh_*` spellings are
/// accepted as aliases of the benchmark deltas.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SymbolMetrics {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub price_change_pct: f64,
    pub perf_5d: f64,
    pub perf_20d: f64,
    pub perf_60d: f64,
    pub perf_180d: f64,
    #[serde(alias = "vs_smh_5d")]
    pub vs_benchmark_5d: f64,
    #[serde(alias = "vs_smh_20d")]
    pub vs_benchmark_20d: f64,
    #[serde(alias = "vs_smh_60d")]
    pub vs_benchmark_60d: f64,
    #[serde(alias = "vs_smh_180d")]
    pub vs_benchmark_180d: f64,
    pub rsi: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub total_score: f64,
    pub rating: Rating,
    pub dollar_volume: f64,
}

impl SymbolMetrics {
    fn scalars(&self) -> [(&'static str, f64); 16] {
        [
            ("price", self.price),
            ("price_change_pct", self.price_change_pct),
            ("perf_5d", self.perf_5d),
            ("perf_20d", self.perf_20d),
            ("perf_60d", self.perf_60d),
            ("perf_180d", self.perf_180d),
            ("vs_benchmark_5d", self.vs_benchmark_5d),
            ("vs_benchmark_20d", self.vs_benchmark_20d),
            ("vs_benchmark_60d", self.vs_benchmark_60d),
            ("vs_benchmark_180d", self.vs_benchmark_180d),
            ("rsi", self.rsi),
            ("volatility", self.volatility),
            ("sharpe_ratio", self.sharpe_ratio),
            ("max_drawdown", self.max_drawdown),
            ("total_score", self.total_score),
            ("dollar_volume", self.dollar_volume),
        ]
    }

    /// All scalars finite; volatility and dollar volume non-negative.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field, value| {
            warn!(ticker = %self.ticker, field, value, "rejecting symbol metrics");
            Err(SignalError::InvalidMetric {
                ticker: self.ticker.clone(),
                field,
                value,
            })
        };
        for (field, value) in self.scalars() {
            if !value.is_finite() {
                return invalid(field, value);
            }
        }
        if self.volatility < 0.0 {
            return invalid("volatility", self.volatility);
        }
        if self.dollar_volume < 0.0 {
            return invalid("dollar_volume", self.dollar_volume);
        }
        Ok(())
    }
}

// ============================================================
// PATTERN EVENT - result of detection (Copy, no allocations)
// ============================================================

/// Pattern family of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum PatternKind {
    Engulfing,
    Doji,
    Hammer,
    ShootingStar,
    MorningStar,
    EveningStar,
    /// Caller-registered detector
    Custom(&'static str),
}

impl PatternKind {
    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Engulfing => "Engulfing",
            PatternKind::Doji => "Doji",
            PatternKind::Hammer => "Hammer",
            PatternKind::ShootingStar => "Shooting Star",
            PatternKind::MorningStar => "Morning Star",
            PatternKind::EveningStar => "Evening Star",
            PatternKind::Custom(name) => name,
        }
    }
}

/// A pattern found at one bar. Several events may share an index.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PatternEvent {
    pub kind: PatternKind,
    /// Position of the completing candle in the scanned series
    pub index: usize,
    pub bullish: bool,
    pub description: &'static str,
}

// ============================================================
// PATTERN DETECTOR TRAITS
// ============================================================

/// Generic pattern detector trait - for concrete types
pub trait PatternDetector: Send + Sync {
    fn kind(&self) -> PatternKind;
    /// Candles the pattern spans, ending at the scanned index
    fn window(&self) -> usize;
    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternEvent>;
}

/// Object-safe pattern detector trait - for custom detectors
pub trait DynPatternDetector: Send + Sync {
    fn kind(&self) -> PatternKind;
    fn window(&self) -> usize;
    fn detect(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternEvent>;
}

impl<D: PatternDetector> DynPatternDetector for D {
    fn kind(&self) -> PatternKind {
        PatternDetector::kind(self)
    }

    fn window(&self) -> usize {
        PatternDetector::window(self)
    }

    fn detect(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternEvent> {
        PatternDetector::detect(self, bars, index)
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternEvent> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, bars, index)),*
                }
            }

            #[inline]
            pub fn kind(&self) -> PatternKind {
                match self {
                    $(Self::$variant(d) => PatternDetector::kind(d)),*
                }
            }

            #[inline]
            pub fn window(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::window(d)),*
                }
            }
        }
    };
}

// Registry order is event order within one index.
define_builtin_detectors! {
    Engulfing(EngulfingDetector),
    Doji(DojiDetector),
    Hammer(HammerDetector),
    ShootingStar(ShootingStarDetector),
    MorningStar(MorningStarDetector),
    EveningStar(EveningStarDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub pattern_filter: Option<Vec<PatternKind>>,
}

/// Pattern detection engine: one pass over the series, every detector per index
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

impl Default for PatternEngine {
    /// Engine with every builtin detector and no filter
    fn default() -> Self {
        Self {
            builtin: builtin_defaults(),
            custom: Vec::new(),
            config: EngineConfig::default(),
        }
    }
}

impl PatternEngine {
    /// Scan all bars and return a flat list of events in index order.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternEvent>> {
        validate_bars(bars)?;

        let bar_refs = self.bar_refs(bars);
        let mut events = Vec::new();
        for i in 1..bars.len() {
            events.extend(self.scan_at_internal(bars, &bar_refs, i));
        }

        debug!(bars = bars.len(), events = events.len(), "pattern scan complete");
        Ok(events)
    }

    /// Scan and return events grouped by bar index.
    pub fn scan_grouped<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<Vec<PatternEvent>>> {
        validate_bars(bars)?;

        let bar_refs = self.bar_refs(bars);
        Ok((0..bars.len())
            .map(|i| self.scan_at_internal(bars, &bar_refs, i))
            .collect())
    }

    /// Create an iterator over bars with their events.
    pub fn iter<'a, T: OHLCV>(&'a self, bars: &'a [T]) -> Result<PatternIterator<'a, T>> {
        validate_bars(bars)?;
        Ok(PatternIterator::new(self, bars))
    }

    /// Number of registered detectors
    pub fn len(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn bar_refs<'a, T: OHLCV>(&self, bars: &'a [T]) -> Vec<&'a dyn OHLCV> {
        if self.custom.is_empty() {
            Vec::new()
        } else {
            bars.iter().map(|b| b as &dyn OHLCV).collect()
        }
    }

    fn scan_at_internal<T: OHLCV>(
        &self,
        bars: &[T],
        bar_refs: &[&dyn OHLCV],
        index: usize,
    ) -> Vec<PatternEvent> {
        let mut results = Vec::new();
        // Every pattern completes on a bar with a predecessor
        if index == 0 {
            return results;
        }

        // Fast path: builtin detectors (enum dispatch, no vtable)
        for detector in &self.builtin {
            if index + 1 >= detector.window() {
                if let Some(event) = detector.detect(bars, index) {
                    if self.should_include(&event) {
                        results.push(event);
                    }
                }
            }
        }

        // Slow path: custom detectors (vtable)
        if !bar_refs.is_empty() {
            for detector in &self.custom {
                if index + 1 >= detector.window() {
                    if let Some(event) = detector.detect(bar_refs, index) {
                        if self.should_include(&event) {
                            results.push(event);
                        }
                    }
                }
            }
        }

        results
    }

    fn should_include(&self, event: &PatternEvent) -> bool {
        match self.config.pattern_filter {
            Some(ref filter) => filter.contains(&event.kind),
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let kinds = self
            .builtin
            .iter()
            .map(BuiltinDetector::kind)
            .chain(self.custom.iter().map(|d| d.kind()));
        for kind in kinds {
            if !seen.insert(kind) {
                return Err(SignalError::InvalidConfig(format!(
                    "duplicate detector for {}",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// Detect patterns with the default registry.
pub fn detect_patterns<T: OHLCV>(bars: &[T]) -> Result<Vec<PatternEvent>> {
    PatternEngine::default().scan(bars)
}

// ============================================================
// PATTERN ITERATOR
// ============================================================

/// Events found at a specific bar
#[derive(Debug, Clone)]
pub struct BarPatterns {
    pub index: usize,
    pub events: Vec<PatternEvent>,
}

/// Iterator over bars with their events
pub struct PatternIterator<'a, T: OHLCV> {
    engine: &'a PatternEngine,
    bars: &'a [T],
    bar_refs: Vec<&'a dyn OHLCV>,
    current: usize,
}

impl<'a, T: OHLCV> PatternIterator<'a, T> {
    fn new(engine: &'a PatternEngine, bars: &'a [T]) -> Self {
        Self {
            engine,
            bars,
            bar_refs: engine.bar_refs(bars),
            current: 0,
        }
    }
}

impl<'a, T: OHLCV> Iterator for PatternIterator<'a, T> {
    type Item = BarPatterns;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.bars.len() {
            return None;
        }

        let index = self.current;
        let events = self
            .engine
            .scan_at_internal(self.bars, &self.bar_refs, index);

        self.current += 1;

        Some(BarPatterns { index, events })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bars.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl<'a, T: OHLCV> ExactSizeIterator for PatternIterator<'a, T> {}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Default)]
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: EngineConfig,
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

fn builtin_defaults() -> Vec<BuiltinDetector> {
    builtin_defaults![
        Engulfing,
        Doji,
        Hammer,
        ShootingStar,
        MorningStar,
        EveningStar,
    ]
    .into()
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all builtin patterns
    pub fn with_all_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults());
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add a custom detector (slow path)
    pub fn add_custom<D: DynPatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Keep only events of these kinds
    pub fn only_patterns(mut self, kinds: impl IntoIterator<Item = PatternKind>) -> Self {
        self.config.pattern_filter = Some(kinds.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub events: Vec<PatternEvent>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: SignalError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(
    engine: &PatternEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|events| ScanResult {
                    symbol: symbol.to_string(),
                    events,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

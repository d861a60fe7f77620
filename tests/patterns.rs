//! Integration tests for candlestick pattern detection.
//!
//! Each reversal family is exercised on a hand-built window where it is the
//! only rule that fires.

use chrono::{Days, NaiveDate};
use sigscope::prelude::*;

/// Undated bar, to check the engine works on any OHLCV type
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

impl TestBar {
    fn new(o: f64, h: f64, l: f64, c: f64) -> Self {
        Self { o, h, l, c }
    }
}

impl OHLCV for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        1000.0
    }
}

/// Dated candles from (o, h, l, c) tuples, one day apart
fn candles(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle::new(start + Days::new(i as u64), o, h, l, c, 1_000.0))
        .collect()
}

fn kinds(events: &[PatternEvent]) -> Vec<(PatternKind, usize, bool)> {
    events.iter().map(|e| (e.kind, e.index, e.bullish)).collect()
}

// ============================================================
// PATTERN FAMILIES
// ============================================================

#[test]
fn test_bullish_engulfing_scenario() {
    let bars = candles(&[(10.0, 11.0, 9.0, 9.5), (9.4, 11.5, 9.2, 11.0)]);

    let events = detect_patterns(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::Engulfing, 1, true)]);
    assert_eq!(events[0].description, "Bullish engulfing - strong reversal signal");
}

#[test]
fn test_bearish_engulfing() {
    let bars = candles(&[(9.5, 11.0, 9.0, 10.0), (10.1, 10.5, 8.6, 9.0)]);

    let events = detect_patterns(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::Engulfing, 1, false)]);
}

#[test]
fn test_doji_bias_follows_previous_close() {
    let up = candles(&[(100.0, 102.0, 99.0, 101.0), (101.0, 103.0, 99.0, 101.05)]);
    assert_eq!(
        kinds(&detect_patterns(&up).unwrap()),
        [(PatternKind::Doji, 1, true)]
    );

    let down = candles(&[(100.0, 102.0, 99.0, 101.0), (101.0, 103.0, 99.0, 100.95)]);
    assert_eq!(
        kinds(&detect_patterns(&down).unwrap()),
        [(PatternKind::Doji, 1, false)]
    );
}

#[test]
fn test_zero_range_is_not_doji() {
    let bars = candles(&[(10.0, 10.0, 10.0, 10.0), (10.0, 10.0, 10.0, 10.0)]);
    assert!(detect_patterns(&bars).unwrap().is_empty());
}

#[test]
fn test_hammer() {
    let bars = candles(&[(101.0, 102.0, 99.5, 100.0), (99.0, 100.3, 95.0, 100.0)]);

    let events = detect_patterns(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::Hammer, 1, true)]);
}

#[test]
fn test_shooting_star() {
    let bars = candles(&[(99.0, 100.5, 98.5, 100.0), (101.0, 104.0, 99.8, 100.0)]);

    let events = detect_patterns(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::ShootingStar, 1, false)]);
    assert_eq!(events[0].kind.as_str(), "Shooting Star");
}

#[test]
fn test_morning_star() {
    let bars = candles(&[
        (110.0, 111.0, 99.0, 100.0),
        (99.0, 99.5, 97.5, 98.5),
        (99.0, 107.5, 98.8, 107.0),
    ]);

    let events = detect_patterns(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::MorningStar, 2, true)]);
}

#[test]
fn test_evening_star() {
    let bars = candles(&[
        (100.0, 111.0, 99.0, 110.0),
        (111.0, 112.5, 110.5, 111.5),
        (111.0, 111.2, 102.5, 103.0),
    ]);

    let events = detect_patterns(&bars).unwrap();
    assert!(events
        .iter()
        .any(|e| e.kind == PatternKind::EveningStar && e.index == 2 && !e.bullish));
    assert!(events.iter().all(|e| e.kind != PatternKind::MorningStar));
}

#[test]
fn test_events_share_an_index_in_registry_order() {
    // Bearish engulfing that is also a shooting star
    let bars = candles(&[(99.0, 100.2, 98.8, 100.0), (101.0, 106.0, 98.8, 98.9)]);

    let events = detect_patterns(&bars).unwrap();
    let at_one: Vec<_> = events.iter().filter(|e| e.index == 1).map(|e| e.kind).collect();
    assert_eq!(at_one, [PatternKind::Engulfing, PatternKind::ShootingStar]);
}

// ============================================================
// ENGINE
// ============================================================

#[test]
fn test_short_series_are_empty() {
    let empty: Vec<Candle> = Vec::new();
    assert!(detect_patterns(&empty).unwrap().is_empty());

    let single = candles(&[(10.0, 11.0, 9.0, 9.5)]);
    assert!(detect_patterns(&single).unwrap().is_empty());
}

#[test]
fn test_undated_bars() {
    let bars = vec![
        TestBar::new(10.0, 11.0, 9.0, 9.5),
        TestBar::new(9.4, 11.5, 9.2, 11.0),
    ];
    let events = PatternEngine::default().scan(&bars).unwrap();
    assert_eq!(events.len(), 1);
}

#[test]
fn test_single_detector_engine() {
    let bars = candles(&[
        (110.0, 111.0, 99.0, 100.0),
        (99.0, 99.5, 97.5, 98.5),
        (99.0, 107.5, 98.8, 107.0),
    ]);
    let engine = EngineBuilder::new()
        .add(BuiltinDetector::Doji(DojiDetector::with_defaults()))
        .build()
        .unwrap();

    assert_eq!(engine.len(), 1);
    assert!(engine.scan(&bars).unwrap().is_empty());
}

#[test]
fn test_only_patterns_filter() {
    let bars = candles(&[(99.0, 100.2, 98.8, 100.0), (101.0, 106.0, 98.8, 98.9)]);
    let engine = EngineBuilder::new()
        .with_all_defaults()
        .only_patterns([PatternKind::ShootingStar])
        .build()
        .unwrap();

    let events = engine.scan(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::ShootingStar, 1, false)]);
}

#[test]
fn test_duplicate_detector_rejected() {
    let result = EngineBuilder::new()
        .with_all_defaults()
        .add(BuiltinDetector::Hammer(HammerDetector))
        .build();
    assert!(matches!(result, Err(SignalError::InvalidConfig(_))));
}

/// Gap above the previous high
struct GapUp;

impl DynPatternDetector for GapUp {
    fn kind(&self) -> PatternKind {
        PatternKind::Custom("Gap Up")
    }

    fn window(&self) -> usize {
        2
    }

    fn detect(&self, bars: &[&dyn OHLCV], index: usize) -> Option<PatternEvent> {
        let prev = bars.get(index.checked_sub(1)?)?;
        let curr = bars.get(index)?;
        (curr.low() > prev.high()).then_some(PatternEvent {
            kind: PatternKind::Custom("Gap Up"),
            index,
            bullish: true,
            description: "Gap up",
        })
    }
}

#[test]
fn test_custom_detector() {
    let bars = candles(&[
        (10.0, 10.5, 9.8, 10.2),
        (10.2, 10.6, 10.0, 10.4),
        (11.0, 11.4, 10.9, 11.2),
    ]);
    let engine = EngineBuilder::new().add_custom(GapUp).build().unwrap();

    let events = engine.scan(&bars).unwrap();
    assert_eq!(kinds(&events), [(PatternKind::Custom("Gap Up"), 2, true)]);
}

#[test]
fn test_iterator_and_grouped_agree() {
    let bars = candles(&[
        (110.0, 111.0, 99.0, 100.0),
        (99.0, 99.5, 97.5, 98.5),
        (99.0, 107.5, 98.8, 107.0),
        (107.0, 108.0, 106.0, 107.05),
    ]);
    let engine = PatternEngine::default();

    let grouped = engine.scan_grouped(&bars).unwrap();
    let iter = engine.iter(&bars).unwrap();
    assert_eq!(iter.len(), bars.len());

    for (bar, events) in iter.zip(&grouped) {
        assert_eq!(&bar.events, events);
    }
    assert!(grouped[0].is_empty());
}

/// Fires on every bar it is asked about
struct EveryBar;

impl DynPatternDetector for EveryBar {
    fn kind(&self) -> PatternKind {
        PatternKind::Custom("Every Bar")
    }

    fn window(&self) -> usize {
        1
    }

    fn detect(&self, _bars: &[&dyn OHLCV], index: usize) -> Option<PatternEvent> {
        Some(PatternEvent {
            kind: PatternKind::Custom("Every Bar"),
            index,
            bullish: true,
            description: "Every bar",
        })
    }
}

#[test]
fn test_entry_points_agree_with_single_bar_detector() {
    let bars = candles(&[
        (10.0, 10.5, 9.8, 10.2),
        (10.2, 10.6, 10.0, 10.4),
        (11.0, 11.4, 10.9, 11.2),
    ]);
    let engine = EngineBuilder::new().add_custom(EveryBar).build().unwrap();

    let flat = engine.scan(&bars).unwrap();
    let grouped: Vec<PatternEvent> = engine
        .scan_grouped(&bars)
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    let iterated: Vec<PatternEvent> = engine
        .iter(&bars)
        .unwrap()
        .flat_map(|b| b.events)
        .collect();

    assert_eq!(flat.len(), 2);
    assert_eq!(grouped, flat);
    assert_eq!(iterated, flat);
    assert!(flat.iter().all(|e| e.index >= 1));
}

// ============================================================
// INPUT CONTRACT
// ============================================================

#[test]
fn test_rejects_high_below_low() {
    let bars = candles(&[(10.0, 11.0, 9.0, 9.5), (10.0, 9.0, 11.0, 10.0)]);
    assert!(matches!(
        detect_patterns(&bars),
        Err(SignalError::InvalidCandle { index: 1, .. })
    ));
}

#[test]
fn test_rejects_duplicate_dates() {
    let mut bars = candles(&[(10.0, 11.0, 9.0, 9.5), (9.4, 11.5, 9.2, 11.0)]);
    bars[1].date = bars[0].date;
    assert!(matches!(
        detect_patterns(&bars),
        Err(SignalError::UnorderedDates { index: 1 })
    ));
}

#[test]
fn test_parallel_scan_splits_errors() {
    let good = candles(&[(10.0, 11.0, 9.0, 9.5), (9.4, 11.5, 9.2, 11.0)]);
    let bad = candles(&[(10.0, 11.0, 9.0, f64::NAN)]);
    let engine = PatternEngine::default();

    let instruments: Vec<(&str, &[Candle])> = vec![("GOOD", &good), ("BAD", &bad)];
    let (ok, err) = scan_parallel(&engine, instruments);

    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].symbol, "GOOD");
    assert_eq!(ok[0].events.len(), 1);
    assert_eq!(err.len(), 1);
    assert_eq!(err[0].symbol, "BAD");
}

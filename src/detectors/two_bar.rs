//! Two-bar candlestick pattern detectors

use crate::{OHLCVExt, PatternDetector, PatternEvent, PatternKind, OHLCV};

impl_with_defaults!(EngulfingDetector);

// ============================================================
// ENGULFING PATTERNS
// ============================================================

/// Engulfing, bullish and bearish.
///
/// The current body must open at or beyond the previous close and close at or
/// beyond the previous open. The two directions need opposite colors on the
/// previous candle, so at most one fires per index.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngulfingDetector;

impl PatternDetector for EngulfingDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Engulfing
    }

    fn window(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternEvent> {
        if index < 1 {
            return None;
        }
        let prev = bars.get(index - 1)?;
        let curr = bars.get(index)?;

        // Bullish: white body wraps the prior black body
        if prev.is_bearish()
            && curr.is_bullish()
            && curr.open() <= prev.close()
            && curr.close() >= prev.open()
        {
            return Some(PatternEvent {
                kind: PatternDetector::kind(self),
                index,
                bullish: true,
                description: "Bullish engulfing - strong reversal signal",
            });
        }

        // Bearish: black body wraps the prior white body
        if prev.is_bullish()
            && curr.is_bearish()
            && curr.open() >= prev.close()
            && curr.close() <= prev.open()
        {
            return Some(PatternEvent {
                kind: PatternDetector::kind(self),
                index,
                bullish: false,
                description: "Bearish engulfing - weakening reversal signal",
            });
        }

        None
    }
}

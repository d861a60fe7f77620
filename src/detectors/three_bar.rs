//! Three-bar candlestick pattern detectors: Morning Star, Evening Star

use super::helpers::is_star_body;
use crate::{OHLCVExt, PatternDetector, PatternEvent, PatternKind, OHLCV};

impl_with_defaults!(MorningStarDetector, EveningStarDetector);

// ============================================================
// STAR PATTERNS
// ============================================================

/// Morning Star: black candle, small-bodied middle, white candle closing
/// above the first body's midpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct MorningStarDetector;

impl PatternDetector for MorningStarDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::MorningStar
    }

    fn window(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternEvent> {
        if index < 2 {
            return None;
        }
        let first = bars.get(index - 2)?;
        let second = bars.get(index - 1)?;
        let third = bars.get(index)?;

        if !first.is_bearish() || !third.is_bullish() {
            return None;
        }
        if !is_star_body(second.body(), first.body()) {
            return None;
        }
        if third.close() <= first.body_midpoint() {
            return None;
        }

        Some(PatternEvent {
            kind: PatternDetector::kind(self),
            index,
            bullish: true,
            description: "Morning Star - strong bullish reversal",
        })
    }
}

/// Evening Star: mirror of the Morning Star at a top
#[derive(Debug, Clone, Copy, Default)]
pub struct EveningStarDetector;

impl PatternDetector for EveningStarDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::EveningStar
    }

    fn window(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternEvent> {
        if index < 2 {
            return None;
        }
        let first = bars.get(index - 2)?;
        let second = bars.get(index - 1)?;
        let third = bars.get(index)?;

        if !first.is_bullish() || !third.is_bearish() {
            return None;
        }
        if !is_star_body(second.body(), first.body()) {
            return None;
        }
        if third.close() >= first.body_midpoint() {
            return None;
        }

        Some(PatternEvent {
            kind: PatternDetector::kind(self),
            index,
            bullish: false,
            description: "Evening Star - strong bearish reversal",
        })
    }
}

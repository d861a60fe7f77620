//! Single-candle shape patterns: Doji, Hammer, Shooting Star
//!
//! The shape is read from the current candle alone. The previous close only
//! confirms the move (Hammer, Shooting Star) or sets the bias (Doji), so all
//! three span two bars and start at index 1.

use super::helpers::{
    is_doji, is_shadow_long, is_shadow_short, HAMMER_CLOSE_FLOOR, SHOOTING_STAR_CLOSE_CEILING,
};
use crate::{OHLCVExt, PatternDetector, PatternEvent, PatternKind, OHLCV};

impl_with_defaults!(DojiDetector, HammerDetector, ShootingStarDetector);

// ============================================================
// DOJI
// ============================================================

/// Doji: body below a tenth of the high-low range.
///
/// Bullish when the close is above the previous close, bearish otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DojiDetector;

impl PatternDetector for DojiDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Doji
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

        if !is_doji(curr.body(), curr.range()) {
            return None;
        }

        Some(PatternEvent {
            kind: PatternDetector::kind(self),
            index,
            bullish: curr.close() > prev.close(),
            description: "Doji - market indecision",
        })
    }
}

// ============================================================
// HAMMER FAMILY
// ============================================================

/// Hammer: long lower shadow, little upper shadow, close holding near the prior close
#[derive(Debug, Clone, Copy, Default)]
pub struct HammerDetector;

impl PatternDetector for HammerDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Hammer
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

        let body = curr.body();
        if !is_shadow_long(curr.lower_shadow(), body) || !is_shadow_short(curr.upper_shadow(), body)
        {
            return None;
        }
        if curr.close() <= prev.close() * HAMMER_CLOSE_FLOOR {
            return None;
        }

        Some(PatternEvent {
            kind: PatternDetector::kind(self),
            index,
            bullish: true,
            description: "Hammer - potential bullish reversal",
        })
    }
}

/// Shooting Star: the inverted hammer shape with the close capped near the prior close
#[derive(Debug, Clone, Copy, Default)]
pub struct ShootingStarDetector;

impl PatternDetector for ShootingStarDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::ShootingStar
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

        let body = curr.body();
        if !is_shadow_long(curr.upper_shadow(), body) || !is_shadow_short(curr.lower_shadow(), body)
        {
            return None;
        }
        if curr.close() >= prev.close() * SHOOTING_STAR_CLOSE_CEILING {
            return None;
        }

        Some(PatternEvent {
            kind: PatternDetector::kind(self),
            index,
            bullish: false,
            description: "Shooting Star - potential bearish reversal",
        })
    }
}

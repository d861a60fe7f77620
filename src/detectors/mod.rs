//! Candlestick pattern detectors
//!
//! Each detector is one entry of the registry scanned by [`crate::PatternEngine`]:
//! a pattern kind, the number of candles it spans, and a predicate over the
//! window ending at the scanned index. Thresholds are fixed constants in
//! [`helpers`]; callers wanting different sensitivity post-filter events.
//!
//! # Pattern Categories
//!
//! - **Single-candle shape**: Doji, Hammer, Shooting Star (confirmed against the prior close)
//! - **Two-bar**: Engulfing (bullish and bearish)
//! - **Three-bar**: Morning Star, Evening Star

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

// Re-export all detectors for convenience
pub use helpers::*;
pub use single_bar::*;
pub use three_bar::*;
pub use two_bar::*;

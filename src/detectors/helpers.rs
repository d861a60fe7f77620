//! Shared thresholds and comparisons for the candlestick detectors

// ============================================================
// THRESHOLDS
// ============================================================

/// Doji: body < range * DOJI_BODY_RATIO
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Long shadow: shadow > body * SHADOW_LONG_FACTOR
pub const SHADOW_LONG_FACTOR: f64 = 2.0;
/// Short shadow: shadow < body * SHADOW_SHORT_FACTOR
pub const SHADOW_SHORT_FACTOR: f64 = 0.5;
/// Hammer confirmation: close > previous close * HAMMER_CLOSE_FLOOR
pub const HAMMER_CLOSE_FLOOR: f64 = 0.98;
/// Shooting Star confirmation: close < previous close * SHOOTING_STAR_CLOSE_CEILING
pub const SHOOTING_STAR_CLOSE_CEILING: f64 = 1.02;
/// Star middle body: body < first body * STAR_BODY_FACTOR
pub const STAR_BODY_FACTOR: f64 = 0.5;

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// Body under a tenth of the range. Zero-range candles never qualify.
#[inline]
pub fn is_doji(body: f64, range: f64) -> bool {
    range > 0.0 && body < range * DOJI_BODY_RATIO
}

/// Shadow more than twice the body
#[inline]
pub fn is_shadow_long(shadow: f64, body: f64) -> bool {
    shadow > body * SHADOW_LONG_FACTOR
}

/// Shadow under half the body. Never true for a zero body.
#[inline]
pub fn is_shadow_short(shadow: f64, body: f64) -> bool {
    shadow < body * SHADOW_SHORT_FACTOR
}

/// Middle candle of a star is less than half the first candle's body
#[inline]
pub fn is_star_body(middle_body: f64, first_body: f64) -> bool {
    middle_body < first_body * STAR_BODY_FACTOR
}

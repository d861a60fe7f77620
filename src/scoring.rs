//! Risk score and buy/sell recommendation for one symbol
//!
//! The risk score adds independent penalties for volatility, RSI extremes,
//! drawdown depth and a weak Sharpe ratio. The recommendation is an ordered
//! decision list over the symbol's score, momentum and benchmark delta; an
//! optional [`MarketRegime`] can only turn a bullish call into `Watch`.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{regime::MarketRegime, Result, SignalError, SymbolMetrics};

// ============================================================
// RISK
// ============================================================

/// Risk in `[0, 100]`, higher is riskier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MAX: u8 = 100;

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn level(self) -> RiskLevel {
        match self.0 {
            60.. => RiskLevel::High,
            40.. => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Additive risk score, clamped to 100.
///
/// Reads volatility, RSI, max drawdown and Sharpe ratio, but the whole
/// record is validated like every other entry point: a non-finite value in
/// any field is an error.
///
/// ```rust
/// use sigscope::prelude::*;
///
/// let metrics = SymbolMetrics {
///     volatility: 60.0,
///     rsi: 80.0,
///     max_drawdown: -35.0,
///     sharpe_ratio: 0.3,
///     ..SymbolMetrics::default()
/// };
/// let risk = risk_score(&metrics).unwrap();
/// assert_eq!(risk.value(), 85);
/// assert_eq!(risk.level(), RiskLevel::High);
/// ```
pub fn risk_score(metrics: &SymbolMetrics) -> Result<RiskScore> {
    metrics.validate()?;
    Ok(risk_score_unchecked(metrics))
}

fn risk_score_unchecked(m: &SymbolMetrics) -> RiskScore {
    let volatility = if m.volatility > 50.0 {
        30
    } else if m.volatility > 35.0 {
        15
    } else {
        0
    };
    let rsi = if m.rsi > 75.0 {
        20
    } else if m.rsi < 25.0 {
        15
    } else {
        0
    };
    let drawdown = if m.max_drawdown < -30.0 {
        20
    } else if m.max_drawdown < -20.0 {
        10
    } else {
        0
    };
    let sharpe = if m.sharpe_ratio < 0.5 { 15 } else { 0 };

    let total: u32 = volatility + rsi + drawdown + sharpe;
    RiskScore(total.min(RiskScore::MAX as u32) as u8)
}

// ============================================================
// RECOMMENDATION
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecommendationLabel {
    StrongBuy,
    Buy,
    Hold,
    Caution,
    Sell,
    StrongSell,
    /// Bullish call suppressed by the market regime
    Watch,
}

impl RecommendationLabel {
    pub fn is_bullish(self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Caution => "Caution",
            Self::Sell => "Sell",
            Self::StrongSell => "Strong Sell",
            Self::Watch => "Watch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub label: RecommendationLabel,
    pub rationale: String,
}

struct Rule {
    label: RecommendationLabel,
    rationale: &'static str,
    applies: fn(&SymbolMetrics) -> bool,
}

fn strong_buy(m: &SymbolMetrics) -> bool {
    m.total_score >= 75.0 && m.vs_benchmark_20d > 5.0 && m.perf_20d > 5.0 && m.rsi < 70.0
}

fn buy(m: &SymbolMetrics) -> bool {
    m.total_score >= 60.0 && m.vs_benchmark_20d > 0.0 && m.perf_20d > 0.0
}

fn strong_sell(m: &SymbolMetrics) -> bool {
    m.total_score < 35.0 && m.vs_benchmark_20d < -5.0 && m.perf_20d < -5.0
}

fn sell(m: &SymbolMetrics) -> bool {
    m.total_score < 50.0 && m.vs_benchmark_20d < 0.0 && m.perf_20d < 0.0
}

fn overbought(m: &SymbolMetrics) -> bool {
    m.rsi > 75.0 && m.perf_20d > 15.0
}

fn volatile(m: &SymbolMetrics) -> bool {
    m.volatility > 50.0
}

// First match wins.
const RULES: &[Rule] = &[
    Rule {
        label: RecommendationLabel::StrongBuy,
        rationale: "High score with strong momentum, outperforming the benchmark",
        applies: strong_buy,
    },
    Rule {
        label: RecommendationLabel::Buy,
        rationale: "Solid score, positive momentum and ahead of the benchmark",
        applies: buy,
    },
    Rule {
        label: RecommendationLabel::StrongSell,
        rationale: "Low score, falling and lagging the benchmark badly",
        applies: strong_sell,
    },
    Rule {
        label: RecommendationLabel::Sell,
        rationale: "Weak score, falling and lagging the benchmark",
        applies: sell,
    },
    Rule {
        label: RecommendationLabel::Caution,
        rationale: "Overbought after a sharp run-up, pullback risk",
        applies: overbought,
    },
    Rule {
        label: RecommendationLabel::Caution,
        rationale: "Volatility above 50%, size positions carefully",
        applies: volatile,
    },
];

const HOLD_RATIONALE: &str = "No clear edge, keep current position";

/// Ordered decision list, then the regime gate.
///
/// A regime with `allow_new_longs == false` turns `StrongBuy`/`Buy` into
/// `Watch`; any other regime, or none, leaves the result untouched.
pub fn recommend(metrics: &SymbolMetrics, regime: Option<&MarketRegime>) -> Result<Recommendation> {
    metrics.validate()?;
    Ok(recommend_unchecked(metrics, regime))
}

fn recommend_unchecked(metrics: &SymbolMetrics, regime: Option<&MarketRegime>) -> Recommendation {
    let (label, rationale) = RULES
        .iter()
        .find(|rule| (rule.applies)(metrics))
        .map_or((RecommendationLabel::Hold, HOLD_RATIONALE), |rule| {
            (rule.label, rule.rationale)
        });

    match regime {
        Some(gate) if !gate.allow_new_longs && label.is_bullish() => {
            trace!(ticker = %metrics.ticker, suppressed = label.as_str(), regime = %gate.label, "regime gate");
            Recommendation {
                label: RecommendationLabel::Watch,
                rationale: format!(
                    "Market regime unfavourable ({}), wait for a better entry",
                    gate.label
                ),
            }
        }
        _ => Recommendation {
            label,
            rationale: rationale.to_string(),
        },
    }
}

// ============================================================
// ASSESSMENT
// ============================================================

/// Risk and recommendation for one symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub ticker: String,
    pub risk: RiskScore,
    pub recommendation: Recommendation,
}

pub fn assess(metrics: &SymbolMetrics, regime: Option<&MarketRegime>) -> Result<Assessment> {
    metrics.validate()?;
    Ok(Assessment {
        ticker: metrics.ticker.clone(),
        risk: risk_score_unchecked(metrics),
        recommendation: recommend_unchecked(metrics, regime),
    })
}

/// Assess many symbols in parallel; input order is kept in both outputs.
pub fn assess_parallel(
    symbols: &[SymbolMetrics],
    regime: Option<&MarketRegime>,
) -> (Vec<Assessment>, Vec<SignalError>) {
    let results: Vec<_> = symbols
        .par_iter()
        .map(|metrics| assess(metrics, regime))
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(a) => successes.push(a),
            Err(e) => errors.push(e),
        }
    }

    debug!(assessed = successes.len(), rejected = errors.len(), "parallel assessment");
    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

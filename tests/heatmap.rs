//! Integration tests for heatmap aggregation.

use std::collections::HashSet;

use sigscope::prelude::*;

const UNIVERSE: &str = r#"[
    { "ticker": "NVDA", "rating": "S", "total_score": 92, "perf_20d": 18.0, "dollar_volume": 3.0e10 },
    { "ticker": "AVGO", "rating": "A", "total_score": 81, "perf_20d": 9.5,  "dollar_volume": 5.0e9 },
    { "ticker": "TSM",  "rating": "A", "total_score": 84, "perf_20d": 6.0,  "dollar_volume": 4.0e9 },
    { "ticker": "INTC", "rating": "D", "total_score": 28, "perf_20d": -14.0, "dollar_volume": 2.0e9 },
    { "ticker": "WOLF", "rating": "F", "total_score": 12, "perf_20d": -31.0, "dollar_volume": 9.0e8 },
    { "ticker": "ODD",  "rating": "Z", "total_score": 40, "perf_20d": -2.0, "dollar_volume": 1.5e6 },
    { "ticker": "MU",   "rating": "B", "total_score": 66, "perf_20d": 0.0,  "dollar_volume": 1.2e9 }
]"#;

fn universe() -> Vec<SymbolMetrics> {
    serde_json::from_str(UNIVERSE).unwrap()
}

fn tickers(group: &HeatmapGroup) -> Vec<&str> {
    group.members.iter().map(|t| t.ticker.as_str()).collect()
}

#[test]
fn test_rating_partition() {
    let map = aggregate(&universe(), GroupBy::Rating, HeatmapMetric::Perf20d).unwrap();

    let names: Vec<_> = map.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Rating S", "Rating A", "Rating B", "Rating F", "Rating D"]);

    assert_eq!(tickers(&map.groups[1]), ["TSM", "AVGO"]);
    assert_eq!(map.groups[1].average, 82.5);
    // unknown rating lands in F
    assert_eq!(tickers(&map.groups[3]), ["ODD"]);
}

#[test]
fn test_performance_partition() {
    let map = aggregate(&universe(), GroupBy::Performance, HeatmapMetric::Perf20d).unwrap();

    let names: Vec<_> = map.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Strong", "Moderate", "Weak", "Very Weak"]);
    assert_eq!(tickers(&map.groups[0]), ["NVDA"]);
    assert_eq!(tickers(&map.groups[1]), ["AVGO", "TSM"]);
    assert_eq!(tickers(&map.groups[2]), ["MU", "ODD"]);
    assert_eq!(tickers(&map.groups[3]), ["INTC"]);
}

#[test]
fn test_single_group_and_partition_completeness() {
    let symbols = universe();
    for group_by in [GroupBy::Rating, GroupBy::Performance, GroupBy::All] {
        let map = aggregate(&symbols, group_by, HeatmapMetric::TotalScore).unwrap();

        let members: Vec<&str> = map.tiles().map(|t| t.ticker.as_str()).collect();
        let unique: HashSet<&str> = members.iter().copied().collect();
        assert_eq!(members.len(), unique.len(), "{group_by:?} overlaps");

        let liquid: HashSet<&str> = symbols
            .iter()
            .filter(|s| s.dollar_volume > 1_000_000.0)
            .map(|s| s.ticker.as_str())
            .collect();
        assert_eq!(unique, liquid, "{group_by:?}");
        assert!(!unique.contains("WOLF"));
    }

    let all = aggregate(&symbols, GroupBy::All, HeatmapMetric::TotalScore).unwrap();
    assert_eq!(all.groups.len(), 1);
    assert_eq!(
        tickers(&all.groups[0]),
        ["NVDA", "TSM", "AVGO", "MU", "ODD", "INTC"]
    );
}

#[test]
fn test_illiquid_symbol_does_not_stretch_scale() {
    let map = aggregate(&universe(), GroupBy::All, HeatmapMetric::Perf20d).unwrap();
    let scale = map.scale.unwrap();
    assert_eq!(scale.min, -14.0);
    assert_eq!(scale.max, 18.0);

    let color_of = |ticker: &str| map.tiles().find(|t| t.ticker == ticker).unwrap().color;
    assert_eq!(color_of("NVDA").hex(), "#00ff78");
    assert_eq!(color_of("INTC").hex(), "#ff2832");
}

#[test]
fn test_summary() {
    let map = aggregate(&universe(), GroupBy::Rating, HeatmapMetric::Perf20d).unwrap();
    let summary = &map.summary;

    assert_eq!(summary.total, 6);
    assert_eq!(summary.outperforming, 3);
    assert_eq!(summary.underperforming, 3);
    assert_eq!(summary.strongest.as_deref(), Some("NVDA"));
    assert_eq!(summary.weakest.as_deref(), Some("INTC"));
    assert!((summary.average - 17.5 / 6.0).abs() < 1e-9);
}

#[test]
fn test_all_equal_metric_is_gray() {
    let symbols: Vec<SymbolMetrics> = ["A", "B", "C"]
        .iter()
        .map(|t| SymbolMetrics {
            ticker: t.to_string(),
            perf_20d: 4.0,
            dollar_volume: 2.0e6,
            ..SymbolMetrics::default()
        })
        .collect();

    let map = aggregate(&symbols, GroupBy::All, HeatmapMetric::Perf20d).unwrap();
    assert!(map.tiles().all(|t| t.color.hex() == "#334155"));
}

#[test]
fn test_custom_liquidity_floor() {
    let config: HeatmapConfig = serde_json::from_str(r#"{ "min_dollar_volume": 5.0e9 }"#).unwrap();
    let map = HeatmapAggregator::new(config)
        .aggregate(&universe(), GroupBy::All, HeatmapMetric::TotalScore)
        .unwrap();

    assert_eq!(tickers(&map.groups[0]), ["NVDA"]);
}

#[test]
fn test_empty_universe() {
    let map = aggregate(&[], GroupBy::Performance, HeatmapMetric::Perf60d).unwrap();
    assert!(map.groups.is_empty());
    assert!(map.scale.is_none());
    assert_eq!(map.summary.total, 0);
}

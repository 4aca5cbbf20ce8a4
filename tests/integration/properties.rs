//! Invariants checked over deterministic pseudo-random series.

use price_analytics::forecast::ForecastEngine;
use price_analytics::metrics::{compute_batch, compute_metrics, TrackedItem};
use price_analytics::ranking::rank;
use price_analytics::types::{ItemLabel, RankKind, Trend, Window};

use crate::fixtures::{day, random_series, series, Lcg};

fn window() -> Window {
    Window::new(day(0), day(10_000)).unwrap()
}

#[test]
fn test_avg_between_low_and_high() {
    let mut rng = Lcg::new(7);
    for i in 0..200 {
        let len = rng.range(1, 40) as usize;
        let s = random_series(&format!("item-{i}"), &mut rng, len);
        let m = compute_metrics(&s, &window(), &ItemLabel::new("x")).unwrap();
        assert!(m.lowest_price <= m.avg_price, "{m:?}");
        assert!(m.avg_price <= m.highest_price, "{m:?}");
    }
}

#[test]
fn test_volatility_zero_iff_identical() {
    let mut rng = Lcg::new(11);
    for i in 0..200 {
        let len = rng.range(1, 30) as usize;
        let s = random_series(&format!("item-{i}"), &mut rng, len);
        let m = compute_metrics(&s, &window(), &ItemLabel::new("x")).unwrap();
        let identical = m.lowest_price == m.highest_price;
        assert_eq!(m.volatility_exact == 0.0, identical, "{m:?}");
    }

    let flat = series("flat", &[(0, 42), (1, 42), (2, 42), (3, 42)]);
    let m = compute_metrics(&flat, &window(), &ItemLabel::new("x")).unwrap();
    assert_eq!(m.volatility, 0.0);
}

#[test]
fn test_gainers_only_contain_uptrends() {
    let mut rng = Lcg::new(23);
    let items: Vec<TrackedItem> = (0..100)
        .map(|i| {
            let len = rng.range(1, 15) as usize;
            TrackedItem::new(
                random_series(&format!("item-{i}"), &mut rng, len),
                ItemLabel::new(format!("Item {i}")),
            )
        })
        .collect();
    let metrics = compute_batch(&items, &window());
    for n in [0, 1, 5, 50, 500] {
        let gainers = rank(&metrics, RankKind::Gainers, n);
        assert!(gainers.len() <= n);
        assert!(gainers.iter().all(|m| m.trend == Trend::Up));
        assert!(gainers
            .windows(2)
            .all(|w| w[0].percent_change >= w[1].percent_change));
    }
}

#[test]
fn test_metrics_are_deterministic() {
    let mut rng = Lcg::new(99);
    let s = random_series("det", &mut rng, 25);
    let a = compute_metrics(&s, &window(), &ItemLabel::new("x")).unwrap();
    let b = compute_metrics(&s, &window(), &ItemLabel::new("x")).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_vec(&a).unwrap(),
        serde_json::to_vec(&b).unwrap()
    );
}

#[test]
fn test_forecast_confidence_in_unit_interval() {
    let engine = ForecastEngine::default();
    let mut rng = Lcg::new(5);
    for i in 0..200 {
        let len = rng.range(5, 60) as usize;
        let s = random_series(&format!("item-{i}"), &mut rng, len);
        let as_of = s.latest().unwrap().timestamp;
        let f = engine.forecast_default(&s, as_of).unwrap();
        assert!(!f.confidence.is_nan());
        assert!((0.0..=1.0).contains(&f.confidence), "{}", f.confidence);
        assert!(f.predicted_value >= 0);
    }
}

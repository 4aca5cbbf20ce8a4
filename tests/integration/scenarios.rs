//! End-to-end scenarios over the public engine API.

use chrono::Duration;

use price_analytics::forecast::ForecastEngine;
use price_analytics::metrics::{compute_batch, compute_metrics, TrackedItem};
use price_analytics::ranking::{average_change, build_ranking, rank, summarize};
use price_analytics::series::Series;
use price_analytics::types::{
    AnalyticsError, ItemLabel, LookbackPeriod, PriceObservation, RankKind, Trend, Window,
};

use crate::fixtures::{day, key, series};

fn wide_window() -> Window {
    Window::new(day(0), day(1000)).unwrap()
}

#[test]
fn test_two_point_series_reports_uptrend() {
    let s = series("scenario-a", &[(0, 1000), (30, 1100)]);
    let m = compute_metrics(&s, &wide_window(), &ItemLabel::new("A")).unwrap();
    assert_eq!(m.trend, Trend::Up);
    assert_eq!(m.percent_change, 10.0);
}

#[test]
fn test_flat_series_forecast_is_stable() {
    let s = series(
        "scenario-b",
        &[(0, 500), (25, 500), (50, 500), (75, 500), (100, 500)],
    );
    let f = ForecastEngine::default().forecast_default(&s, day(100)).unwrap();
    assert_eq!(f.trend, Trend::Stable);
    assert_eq!(f.predicted_value, 500);
    assert!(f.confidence > 0.0 && f.confidence < 1.0);
}

#[test]
fn test_four_points_cannot_forecast() {
    let s = series("scenario-c", &[(0, 500), (10, 520), (20, 540), (30, 560)]);
    let err = ForecastEngine::default()
        .forecast(&s, day(30), Duration::days(182))
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InsufficientData { required: 5, available: 4 }));
}

#[test]
fn test_gainers_top_two() {
    // Percent changes +50, +10, -5, -5, +30.
    let items = vec![
        TrackedItem::new(series("p50", &[(0, 1000), (10, 1500)]), ItemLabel::new("P50")),
        TrackedItem::new(series("p10", &[(0, 1000), (10, 1100)]), ItemLabel::new("P10")),
        TrackedItem::new(series("m5a", &[(0, 1000), (10, 950)]), ItemLabel::new("M5A")),
        TrackedItem::new(series("m5b", &[(0, 2000), (10, 1900)]), ItemLabel::new("M5B")),
        TrackedItem::new(series("p30", &[(0, 1000), (10, 1300)]), ItemLabel::new("P30")),
    ];
    let metrics = compute_batch(&items, &wide_window());
    let gainers = rank(&metrics, RankKind::Gainers, 2);
    let ids: Vec<&str> = gainers.iter().map(|m| m.item_id.as_str()).collect();
    assert_eq!(ids, vec!["p50", "p30"]);

    let losers = rank(&metrics, RankKind::Losers, 5);
    let ids: Vec<&str> = losers.iter().map(|m| m.item_id.as_str()).collect();
    assert_eq!(ids, vec!["m5a", "m5b"]);
}

#[test]
fn test_empty_summary_average_is_none() {
    assert_eq!(average_change(&[]), None);
    let r = build_ranking(&[], RankKind::MostVolatile, 10);
    assert_eq!(r.average_change, None);
    let s = summarize(&[], 10);
    assert_eq!(s.average_change, None);
    assert!(s.gainers.is_empty() && s.most_active.is_empty());
}

#[test]
fn test_raw_input_normalised_before_metrics() {
    let k = key("raw");
    // Out of order, duplicate timestamp on day 20 (later write wins).
    let raw = vec![
        PriceObservation::new(&k, day(20), 900),
        PriceObservation::new(&k, day(0), 1000),
        PriceObservation::new(&k, day(10), 1200),
        PriceObservation::new(&k, day(20), 1500),
    ];
    let s = Series::from_observations(k, raw).unwrap();
    let m = compute_metrics(&s, &wide_window(), &ItemLabel::new("Raw")).unwrap();
    assert_eq!(m.sample_size, 3);
    assert_eq!(m.first_price, 1000);
    assert_eq!(m.current_price, 1500);
    assert_eq!(m.previous_price, 1200);
    assert_eq!(m.percent_change, 50.0);
}

#[test]
fn test_lookback_periods_scope_metrics() {
    let s = series("periods", &[(0, 100), (60, 200), (85, 300), (89, 400)]);
    let end = day(90);

    let week = compute_metrics(&s, &LookbackPeriod::Week.ending_at(end), &ItemLabel::new("x")).unwrap();
    assert_eq!(week.sample_size, 2);
    assert_eq!(week.first_price, 300);

    let month = compute_metrics(&s, &LookbackPeriod::Month.ending_at(end), &ItemLabel::new("x")).unwrap();
    assert_eq!(month.sample_size, 3);

    let quarter = compute_metrics(&s, &LookbackPeriod::Quarter.ending_at(end), &ItemLabel::new("x")).unwrap();
    assert_eq!(quarter.sample_size, 4);
    assert_eq!(quarter.percent_change, 300.0);
}

#[test]
fn test_most_active_tracks_observation_count() {
    let items = vec![
        TrackedItem::new(series("quiet", &[(0, 100), (5, 100)]), ItemLabel::new("Quiet")),
        TrackedItem::new(
            series("busy", &[(0, 100), (1, 101), (2, 99), (3, 100), (4, 102)]),
            ItemLabel::new("Busy"),
        ),
    ];
    let metrics = compute_batch(&items, &wide_window());
    let active = rank(&metrics, RankKind::MostActive, 1);
    assert_eq!(active[0].item_id, "busy");
}

#[test]
fn test_forecast_growth_projection() {
    // Weekly snapshots climbing 70¢ a week for a year.
    let points: Vec<(i64, i64)> = (0..52).map(|w| (w * 7, 2_000 + w * 70)).collect();
    let s = series("growth", &points);
    let f = ForecastEngine::default().forecast(&s, day(357), Duration::days(182)).unwrap();
    assert_eq!(f.trend, Trend::Up);
    // 10¢/day from 2000 at day 0 → day 539
    assert_eq!(f.predicted_value, 7_390);
    assert!(f.expected_change_pct > 0.0);
    assert!(f.confidence > 0.4, "confidence: {}", f.confidence);
}

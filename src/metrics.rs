//! Metrics calculator.
//!
//! Summary statistics for one series over one window: current/first/high/low/avg
//! price, percent change, trend and volatility. Batch computation fans out across
//! items with rayon since items share no state.

use rayon::prelude::*;
use tracing::debug;

use crate::series::Series;
use crate::types::{mean_cents, percent_change, round_to_tenth, ItemLabel, ItemMetrics, Trend, Window};

/// A series together with the display fields the caller wants echoed back.
#[derive(Debug, Clone)]
pub struct TrackedItem {
    pub series: Series,
    pub label: ItemLabel,
}

impl TrackedItem {
    pub fn new(series: Series, label: ItemLabel) -> Self {
        Self { series, label }
    }
}

/// Compute metrics for `series` over `window` (inclusive).
///
/// Returns `None` when the window holds no observations; callers exclude
/// such items from rankings. With a single observation, previous price
/// equals first price and the change is zero.
pub fn compute_metrics(series: &Series, window: &Window, label: &ItemLabel) -> Option<ItemMetrics> {
    let points = series.window(window);
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            debug!(series = %series.key(), window = %window, "No observations in window");
            return None;
        }
    };

    let n = points.len();
    let first_price = first.price_cents;
    let current_price = last.price_cents;
    let previous_price = if n >= 2 {
        points[n - 2].price_cents
    } else {
        first_price
    };

    let mut highest_price = i64::MIN;
    let mut lowest_price = i64::MAX;
    let mut sum: i128 = 0;
    let mut listing_volume: Option<u64> = None;

    for p in points {
        highest_price = highest_price.max(p.price_cents);
        lowest_price = lowest_price.min(p.price_cents);
        sum += i128::from(p.price_cents);
        if let Some(size) = p.sample_size {
            *listing_volume.get_or_insert(0) += u64::from(size);
        }
    }

    let avg_price = mean_cents(sum, n)?;

    let mean = sum as f64 / n as f64;
    let variance = points
        .iter()
        .map(|p| (p.price_cents as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    let volatility_exact = variance.sqrt();

    let price_change = current_price - first_price;

    Some(ItemMetrics {
        item_id: series.key().item_id.clone(),
        condition: series.key().condition.clone(),
        name: label.name.clone(),
        image_url: label.image_url.clone(),
        current_price,
        previous_price,
        first_price,
        highest_price,
        lowest_price,
        avg_price,
        price_change,
        percent_change: percent_change(first_price, current_price),
        trend: Trend::from_change(price_change),
        volatility: round_to_tenth(volatility_exact),
        volatility_exact,
        sample_size: n,
        listing_volume,
    })
}

/// Compute metrics for many items in parallel.
///
/// Output keeps input order; items with no data in the window are dropped.
pub fn compute_batch(items: &[TrackedItem], window: &Window) -> Vec<ItemMetrics> {
    let metrics: Vec<ItemMetrics> = items
        .par_iter()
        .filter_map(|item| compute_metrics(&item.series, window, &item.label))
        .collect();

    debug!(
        requested = items.len(),
        computed = metrics.len(),
        window = %window,
        "Batch metrics computed"
    );

    metrics
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

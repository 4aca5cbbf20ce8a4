//! Ranking engine.
//!
//! Orders per-item metrics into top-N views: gainers, losers, most volatile
//! and most active. All sorts are stable, so items that tie on the sort key
//! keep their input order.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::types::{round_to_tenth, ItemMetrics, RankKind, Trend};

/// One ranked view plus the aggregate across every input item.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub kind: RankKind,
    pub items: Vec<ItemMetrics>,
    /// Mean percent change over all input items, not just the top N.
    pub average_change: Option<f64>,
    pub total_items: usize,
}

/// All four views over the same set of metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    pub gainers: Vec<ItemMetrics>,
    pub losers: Vec<ItemMetrics>,
    pub most_volatile: Vec<ItemMetrics>,
    pub most_active: Vec<ItemMetrics>,
    pub average_change: Option<f64>,
    pub total_items: usize,
}

/// Produce the top `top_n` items for `kind`.
pub fn rank(all: &[ItemMetrics], kind: RankKind, top_n: usize) -> Vec<ItemMetrics> {
    let mut selected: Vec<&ItemMetrics> = match kind {
        RankKind::Gainers => all.iter().filter(|m| m.trend == Trend::Up).collect(),
        RankKind::Losers => all.iter().filter(|m| m.trend == Trend::Down).collect(),
        RankKind::MostVolatile | RankKind::MostActive => all.iter().collect(),
    };

    selected.sort_by(|a, b| compare(kind, a, b));

    debug!(
        kind = %kind,
        candidates = selected.len(),
        top_n,
        "Ranked items"
    );

    selected.into_iter().take(top_n).cloned().collect()
}

fn compare(kind: RankKind, a: &ItemMetrics, b: &ItemMetrics) -> Ordering {
    match kind {
        RankKind::Gainers => b.percent_change.total_cmp(&a.percent_change),
        RankKind::Losers => a.percent_change.total_cmp(&b.percent_change),
        RankKind::MostVolatile => b.volatility_exact.total_cmp(&a.volatility_exact),
        RankKind::MostActive => b.sample_size.cmp(&a.sample_size),
    }
}

/// Mean of `percent_change` over every item, one decimal.
/// `None` for an empty input.
pub fn average_change(all: &[ItemMetrics]) -> Option<f64> {
    if all.is_empty() {
        return None;
    }
    let sum: f64 = all.iter().map(|m| m.percent_change).sum();
    Some(round_to_tenth(sum / all.len() as f64))
}

/// Rank and attach the aggregate summary.
pub fn build_ranking(all: &[ItemMetrics], kind: RankKind, top_n: usize) -> Ranking {
    Ranking {
        kind,
        items: rank(all, kind, top_n),
        average_change: average_change(all),
        total_items: all.len(),
    }
}

/// Every view at once, each capped at `top_n`.
pub fn summarize(all: &[ItemMetrics], top_n: usize) -> MarketSummary {
    MarketSummary {
        gainers: rank(all, RankKind::Gainers, top_n),
        losers: rank(all, RankKind::Losers, top_n),
        most_volatile: rank(all, RankKind::MostVolatile, top_n),
        most_active: rank(all, RankKind::MostActive, top_n),
        average_change: average_change(all),
        total_items: all.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

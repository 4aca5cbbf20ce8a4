//! Shared types for the price analytics engine.
//!
//! These types form the data model used across all modules.
//! Series, metrics, ranking and forecast modules depend on them
//! without depending on each other.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// Identity of one price history: an item in a specific condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub item_id: String,
    /// Condition label, e.g. "near_mint", "graded_psa_10".
    pub condition: String,
}

impl SeriesKey {
    pub fn new(item_id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            condition: condition.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.item_id, self.condition)
    }
}

/// Where an observation came from. Carried through untouched by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Asking price of active listings.
    Listing,
    /// Completed sale.
    Sale,
    /// Aggregated market price published by a pricing provider.
    MarketPrice,
}

/// Optional structured extension attached to an observation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObservationMeta {
    /// Marketplace or pricing provider name.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub kind: Option<ObservationKind>,
}

/// One market reading for an item in a given condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub item_id: String,
    pub condition: String,
    pub timestamp: DateTime<Utc>,
    /// Price in minor currency units. Must be > 0.
    pub price_cents: i64,
    /// Number of listings/transactions backing this reading.
    #[serde(default)]
    pub sample_size: Option<u32>,
    /// ISO currency code. Uniform within a series, never converted.
    pub currency: String,
    #[serde(default)]
    pub meta: Option<ObservationMeta>,
}

impl PriceObservation {
    /// Build a USD observation for the given series.
    pub fn new(key: &SeriesKey, timestamp: DateTime<Utc>, price_cents: i64) -> Self {
        Self {
            item_id: key.item_id.clone(),
            condition: key.condition.clone(),
            timestamp,
            price_cents,
            sample_size: None,
            currency: "USD".to_string(),
            meta: None,
        }
    }

    pub fn with_sample_size(mut self, sample_size: u32) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_meta(mut self, meta: ObservationMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Whether this observation belongs to the given series.
    pub fn belongs_to(&self, key: &SeriesKey) -> bool {
        self.item_id == key.item_id && self.condition == key.condition
    }
}

impl fmt::Display for PriceObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] @ {}: {}¢ {}",
            self.item_id,
            self.condition,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.price_cents,
            self.currency,
        )
    }
}

/// Display fields passed through from the caller, never computed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemLabel {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ItemLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Inclusive time range `[start, end]` scoping a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvalidWindow(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The window of length `length` ending at `end`.
    pub fn trailing(end: DateTime<Utc>, length: Duration) -> Self {
        let length = length.max(Duration::zero());
        Self {
            start: end - length,
            end,
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Window length in fractional days.
    pub fn length_days(&self) -> f64 {
        days_between(self.start, self.end)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Lookback presets callers choose between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackPeriod {
    Week,
    Month,
    Quarter,
    TwoYears,
}

impl LookbackPeriod {
    pub fn days(&self) -> i64 {
        match self {
            LookbackPeriod::Week => 7,
            LookbackPeriod::Month => 30,
            LookbackPeriod::Quarter => 90,
            LookbackPeriod::TwoYears => 730,
        }
    }

    /// The window of this length ending at `end`.
    pub fn ending_at(&self, end: DateTime<Utc>) -> Window {
        Window::trailing(end, Duration::days(self.days()))
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookbackPeriod::Week => write!(f, "7d"),
            LookbackPeriod::Month => write!(f, "30d"),
            LookbackPeriod::Quarter => write!(f, "90d"),
            LookbackPeriod::TwoYears => write!(f, "2y"),
        }
    }
}

/// Parse "7d", "30d", "90d", "2y" (case-insensitive).
impl std::str::FromStr for LookbackPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7d" | "week" => Ok(LookbackPeriod::Week),
            "30d" | "month" => Ok(LookbackPeriod::Month),
            "90d" | "quarter" => Ok(LookbackPeriod::Quarter),
            "2y" | "730d" => Ok(LookbackPeriod::TwoYears),
            other => Err(anyhow::anyhow!("Unknown lookback period: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction of price movement over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Classify an integer price change.
    pub fn from_change(change_cents: i64) -> Self {
        match change_cents.signum() {
            1 => Trend::Up,
            -1 => Trend::Down,
            _ => Trend::Stable,
        }
    }

    /// Classify a fitted slope; anything within `tolerance` of zero is flat.
    pub fn from_slope(slope: f64, tolerance: f64) -> Self {
        if !slope.is_finite() || slope.abs() < tolerance {
            Trend::Stable
        } else if slope > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Stable => write!(f, "STABLE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Summary statistics for one series over one window.
///
/// Recomputed on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMetrics {
    pub item_id: String,
    pub condition: String,
    pub name: String,
    pub image_url: Option<String>,
    pub current_price: i64,
    pub previous_price: i64,
    pub first_price: i64,
    pub highest_price: i64,
    pub lowest_price: i64,
    pub avg_price: i64,
    /// current_price − first_price
    pub price_change: i64,
    /// price_change / first_price × 100, one decimal.
    pub percent_change: f64,
    pub trend: Trend,
    /// Population standard deviation, one decimal.
    pub volatility: f64,
    /// Unrounded volatility, used for ranking comparisons.
    #[serde(skip)]
    pub volatility_exact: f64,
    /// Number of observations in the window.
    pub sample_size: usize,
    /// Sum of reported listing counts, if any observation carried one.
    pub listing_volume: Option<u64>,
}

impl fmt::Display for ItemMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}¢ ({:+.1}% {}) | vol {:.1} | n={}",
            self.name,
            self.condition,
            self.current_price,
            self.percent_change,
            self.trend,
            self.volatility,
            self.sample_size,
        )
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// Badge tier shown next to a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.7 {
            ConfidenceTier::High
        } else if confidence > 0.4 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

/// Projected price for one series at a future date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub item_id: String,
    pub condition: String,
    /// Projected price in cents, never negative.
    pub predicted_value: i64,
    pub forecast_date: DateTime<Utc>,
    pub trend: Trend,
    /// 0.0–1.0
    pub confidence: f64,
    pub confidence_tier: ConfidenceTier,
    /// Fitted slope in cents per day.
    pub slope_per_day: f64,
    /// Goodness of fit; `None` when the series is flat.
    pub r_squared: Option<f64>,
    /// Observations used for the fit.
    pub sample_count: usize,
    /// Most recent observed price in the lookback window.
    pub last_price: i64,
    /// predicted_value vs last_price, one decimal.
    pub expected_change_pct: f64,
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] → {}¢ by {} ({}, {:.0}% confidence)",
            self.item_id,
            self.condition,
            self.predicted_value,
            self.forecast_date.format("%Y-%m-%d"),
            self.trend,
            self.confidence * 100.0,
        )
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Which ordered view to produce from a set of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKind {
    Gainers,
    Losers,
    MostVolatile,
    MostActive,
}

impl RankKind {
    pub const ALL: &'static [RankKind] = &[
        RankKind::Gainers,
        RankKind::Losers,
        RankKind::MostVolatile,
        RankKind::MostActive,
    ];
}

impl fmt::Display for RankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankKind::Gainers => write!(f, "gainers"),
            RankKind::Losers => write!(f, "losers"),
            RankKind::MostVolatile => write!(f, "most_volatile"),
            RankKind::MostActive => write!(f, "most_active"),
        }
    }
}

/// Parse a rank kind (case-insensitive). "trending" is an alias for most active.
impl std::str::FromStr for RankKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gainers" | "gainer" => Ok(RankKind::Gainers),
            "losers" | "loser" => Ok(RankKind::Losers),
            "volatile" | "most_volatile" | "most-volatile" => Ok(RankKind::MostVolatile),
            "active" | "most_active" | "most-active" | "trending" => Ok(RankKind::MostActive),
            other => Err(anyhow::anyhow!("Unknown rank kind: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Fractional days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 86_400.0
}

/// Round to one decimal place, halves toward positive infinity (-2.25 gives -2.2).
pub fn round_to_tenth(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| {
            let strategy = if d.is_sign_negative() {
                RoundingStrategy::MidpointTowardZero
            } else {
                RoundingStrategy::MidpointAwayFromZero
            };
            d.round_dp_with_strategy(1, strategy)
        })
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Integer mean of cent values, halves rounded up. `None` for an empty set
/// or a mean that does not fit in `i64`.
pub fn mean_cents(sum: i128, count: usize) -> Option<i64> {
    if count == 0 {
        return None;
    }
    let sum = Decimal::from_i128(sum)?;
    (sum / Decimal::from(count as u64))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Percent change from `base` to `value`, one decimal. Zero when `base` is not positive.
pub fn percent_change(base: i64, value: i64) -> f64 {
    if base <= 0 {
        return 0.0;
    }
    round_to_tenth((value - base) as f64 / base as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors the engine can return. All are deterministic in the input;
/// retrying with the same input yields the same error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyticsError {
    /// Input violates the same item/condition/currency invariant, or holds a non-positive price.
    #[error("Malformed series: {0}")]
    MalformedSeries(String),

    #[error("Insufficient data: need {required} observations, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

impl AnalyticsError {
    /// Short machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyticsError::MalformedSeries(_) => "malformed_series",
            AnalyticsError::InsufficientData { .. } => "insufficient_data",
            AnalyticsError::InvalidWindow(_) => "invalid_window",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

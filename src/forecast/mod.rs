//! Forecast engine.
//!
//! Fits a least-squares trend line to the lookback window of a series and
//! projects it to a future date. Confidence is the fit's R² damped by how
//! densely the observations cover the span being projected over.

pub mod regression;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::series::Series;
use crate::types::{
    days_between, percent_change, AnalyticsError, ConfidenceTier, Forecast, Trend, Window,
};

/// Hard floor on observations for a forecast. Below this a line fit says
/// nothing about its own quality.
pub const MIN_FORECAST_POINTS: usize = 5;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Forecast tuning parameters.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// History considered for the fit, in days.
    pub lookback_days: i64,
    /// Default projection horizon, in days.
    pub horizon_days: i64,
    /// Minimum observations in the lookback window. Never below `MIN_FORECAST_POINTS`.
    pub min_points: usize,
    /// Slope magnitude, as a fraction of average price per day, under which the trend is flat.
    pub stable_slope_ratio: f64,
    /// Confidence reported for a series whose prices never move.
    pub flat_confidence: f64,
    /// Expected spacing between observations, in days, for the density factor.
    pub sampling_interval_days: f64,
    /// Coverage at which the density factor reaches one half.
    pub density_half_saturation: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback_days: 730,           // ~2 years
            horizon_days: 182,            // ~6 months
            min_points: MIN_FORECAST_POINTS,
            stable_slope_ratio: 0.0001,   // 0.01% of avg price per day
            flat_confidence: 0.5,
            sampling_interval_days: 7.0,  // weekly snapshots
            density_half_saturation: 0.25,
        }
    }
}

impl ForecastConfig {
    pub fn default_horizon(&self) -> Duration {
        Duration::days(self.horizon_days)
    }

    fn required_points(&self) -> usize {
        self.min_points.max(MIN_FORECAST_POINTS)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Access the forecast configuration.
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast using the configured default horizon.
    pub fn forecast_default(
        &self,
        series: &Series,
        as_of: DateTime<Utc>,
    ) -> Result<Forecast, AnalyticsError> {
        self.forecast(series, as_of, self.config.default_horizon())
    }

    /// Project the price of `series` to `as_of + horizon`.
    ///
    /// Uses observations in `[as_of - lookback, as_of]`. Fails with
    /// `InsufficientData` when fewer than the required points fall inside.
    pub fn forecast(
        &self,
        series: &Series,
        as_of: DateTime<Utc>,
        horizon: Duration,
    ) -> Result<Forecast, AnalyticsError> {
        if horizon < Duration::zero() {
            return Err(AnalyticsError::InvalidWindow(format!(
                "negative forecast horizon of {} days",
                horizon.num_days()
            )));
        }

        let lookback = Window::trailing(as_of, Duration::days(self.config.lookback_days));
        let points = series.window(&lookback);
        let required = self.config.required_points();

        if points.len() < required {
            debug!(
                series = %series.key(),
                available = points.len(),
                required,
                "Not enough history to forecast"
            );
            return Err(AnalyticsError::InsufficientData {
                required,
                available: points.len(),
            });
        }

        let origin = points[0].timestamp;
        let last_price = points[points.len() - 1].price_cents;
        let forecast_date = as_of.checked_add_signed(horizon).ok_or_else(|| {
            AnalyticsError::InvalidWindow(format!(
                "forecast horizon of {} days overflows",
                horizon.num_days()
            ))
        })?;
        let target_x = days_between(origin, forecast_date);

        let xs: Vec<f64> = points.iter().map(|p| days_between(origin, p.timestamp)).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.price_cents as f64).collect();

        let fit = regression::fit(&xs, &ys).ok_or(AnalyticsError::InsufficientData {
            required,
            available: points.len(),
        })?;

        let base = Forecast {
            item_id: series.key().item_id.clone(),
            condition: series.key().condition.clone(),
            predicted_value: last_price,
            forecast_date,
            trend: Trend::Stable,
            confidence: self.config.flat_confidence,
            confidence_tier: ConfidenceTier::from_confidence(self.config.flat_confidence),
            slope_per_day: 0.0,
            r_squared: None,
            sample_count: fit.n,
            last_price,
            expected_change_pct: 0.0,
        };

        let r_squared = match fit.r_squared {
            Some(r2) => r2,
            None => {
                // Every price identical: nothing to fit, report flat.
                debug!(
                    series = %series.key(),
                    price = last_price,
                    "Flat series, using fixed confidence"
                );
                return Ok(base);
            }
        };

        let predicted_value = fit.predict(target_x).max(0.0).round() as i64;
        let tolerance = self.config.stable_slope_ratio * fit.mean_y.abs();
        let trend = Trend::from_slope(fit.slope, tolerance);

        let density = self.density_factor(points.len(), target_x);
        let confidence = combine_confidence(r_squared, density);

        debug!(
            series = %series.key(),
            slope = fit.slope,
            r_squared,
            density,
            confidence,
            predicted_value,
            "Forecast computed"
        );

        Ok(Forecast {
            predicted_value,
            trend,
            confidence,
            confidence_tier: ConfidenceTier::from_confidence(confidence),
            slope_per_day: fit.slope,
            r_squared: Some(r_squared),
            expected_change_pct: percent_change(last_price, predicted_value),
            ..base
        })
    }

    /// Damping term in [0, 1) for `samples` observations supporting a
    /// projection over `span_days`.
    ///
    /// Coverage is samples per expected sampling slot; the factor is
    /// `coverage / (coverage + half_saturation)`, rising toward 1 as
    /// coverage grows.
    pub fn density_factor(&self, samples: usize, span_days: f64) -> f64 {
        let interval = self.config.sampling_interval_days.max(f64::EPSILON);
        let slots = (span_days / interval).max(1.0);
        let coverage = samples as f64 / slots;
        let half = self.config.density_half_saturation.max(0.0);
        if coverage <= 0.0 {
            return 0.0;
        }
        (coverage / (coverage + half)).clamp(0.0, 1.0)
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

/// `r_squared × density`, clipped to [0, 1]. Non-finite inputs give 0.
pub fn combine_confidence(r_squared: f64, density: f64) -> f64 {
    let c = r_squared * density;
    if c.is_finite() {
        c.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

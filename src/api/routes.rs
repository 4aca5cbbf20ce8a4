//! API route handlers.
//!
//! All endpoints take the price history in the request body and return JSON.
//! Engine errors map to 400; only a failed worker task maps to 500.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::{AppConfig, RankingConfig};
use crate::forecast::ForecastEngine;
use crate::metrics::{compute_batch, compute_metrics, TrackedItem};
use crate::ranking::{build_ranking, Ranking};
use crate::series::Series;
use crate::types::{
    AnalyticsError, Forecast, ItemLabel, ItemMetrics, LookbackPeriod, PriceObservation, RankKind,
    SeriesKey, Window,
};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers. Read-only after startup.
pub struct ApiState {
    pub ranking: RankingConfig,
    pub forecast: ForecastEngine,
}

impl ApiState {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            ranking: cfg.ranking.clone(),
            forecast: ForecastEngine::new(cfg.forecast_config()),
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRef {
    pub item_id: String,
    pub condition: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ItemRef {
    fn key(&self) -> SeriesKey {
        SeriesKey::new(self.item_id.clone(), self.condition.clone())
    }

    fn label(&self) -> ItemLabel {
        ItemLabel {
            name: self.name.clone().unwrap_or_else(|| self.item_id.clone()),
            image_url: self.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemHistory {
    pub item: ItemRef,
    #[serde(default)]
    pub observations: Vec<PriceObservation>,
}

impl ItemHistory {
    fn into_tracked(self) -> Result<TrackedItem, AnalyticsError> {
        let series = Series::from_observations(self.item.key(), self.observations)?;
        Ok(TrackedItem::new(series, self.item.label()))
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    pub item: ItemRef,
    #[serde(default)]
    pub observations: Vec<PriceObservation>,
    /// "7d" | "30d" | "90d" | "2y"; ignored when `window` is given.
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub window: Option<Window>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    pub kind: String,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<ItemHistory>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub item: ItemRef,
    #[serde(default)]
    pub observations: Vec<PriceObservation>,
    #[serde(default)]
    pub horizon_days: Option<i64>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiError {
    Analytics(AnalyticsError),
    BadRequest(String),
    Internal(String),
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        ApiError::Analytics(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Analytics(e) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: e.to_string(), kind: e.kind() },
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: msg, kind: "bad_request" },
            ),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: "internal error".to_string(), kind: "internal" },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn resolve_window(
    ranking: &RankingConfig,
    period: Option<&str>,
    window: Option<Window>,
    as_of: Option<DateTime<Utc>>,
) -> Result<Window, ApiError> {
    if let Some(w) = window {
        return Ok(Window::new(w.start, w.end)?);
    }
    let period: LookbackPeriod = match period {
        Some(p) => p.parse().map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?,
        None => ranking
            .period()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };
    Ok(period.ending_at(as_of.unwrap_or_else(Utc::now)))
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /api/metrics
pub async fn post_metrics(
    State(state): State<AppState>,
    Json(req): Json<MetricsRequest>,
) -> Result<Json<ItemMetrics>, ApiError> {
    let window = resolve_window(&state.ranking, req.period.as_deref(), req.window, req.as_of)?;
    let label = req.item.label();
    let series = Series::from_observations(req.item.key(), req.observations)?;

    match compute_metrics(&series, &window, &label) {
        Some(metrics) => {
            info!(
                series = %series.key(),
                window = %window,
                trend = %metrics.trend,
                change = metrics.percent_change,
                "Metrics computed"
            );
            Ok(Json(metrics))
        }
        None => Err(AnalyticsError::InsufficientData {
            required: 1,
            available: 0,
        }
        .into()),
    }
}

/// POST /api/rankings
pub async fn post_rankings(
    State(state): State<AppState>,
    Json(req): Json<RankingRequest>,
) -> Result<Json<Ranking>, ApiError> {
    let kind: RankKind = req
        .kind
        .parse()
        .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?;
    let window = resolve_window(&state.ranking, req.period.as_deref(), None, req.as_of)?;
    let top_n = state.ranking.clamp_top_n(req.top_n);

    let items = req
        .items
        .into_iter()
        .map(ItemHistory::into_tracked)
        .collect::<Result<Vec<_>, _>>()?;
    let requested = items.len();

    let ranking = tokio::task::spawn_blocking(move || {
        let metrics = compute_batch(&items, &window);
        build_ranking(&metrics, kind, top_n)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("ranking task failed: {e}")))?;

    info!(
        kind = %kind,
        window = %window,
        requested,
        ranked = ranking.total_items,
        returned = ranking.items.len(),
        "Ranking computed"
    );

    Ok(Json(ranking))
}

/// POST /api/forecast
pub async fn post_forecast(
    State(state): State<AppState>,
    Json(req): Json<ForecastRequest>,
) -> Result<Json<Forecast>, ApiError> {
    let series = Series::from_observations(req.item.key(), req.observations)?;
    let as_of = req.as_of.unwrap_or_else(Utc::now);
    let horizon = match req.horizon_days {
        Some(days) => Duration::try_days(days)
            .ok_or_else(|| ApiError::BadRequest(format!("horizon_days out of range: {days}")))?,
        None => state.forecast.config().default_horizon(),
    };

    match state.forecast.forecast(&series, as_of, horizon) {
        Ok(forecast) => {
            info!(
                series = %series.key(),
                predicted = forecast.predicted_value,
                trend = %forecast.trend,
                confidence = forecast.confidence,
                "Forecast computed"
            );
            Ok(Json(forecast))
        }
        Err(e) => {
            // Expected for new or thinly traded items.
            debug!(series = %series.key(), error = %e, "Forecast unavailable");
            Err(e.into())
        }
    }
}

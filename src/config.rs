//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults so a partial file (or none at all) still
//! yields a usable configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::forecast::ForecastConfig;
use crate::types::LookbackPeriod;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub forecast: ForecastSection,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "price-analytics".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RankingConfig {
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// One of "7d", "30d", "90d", "2y".
    pub default_period: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_top_n: 10,
            max_top_n: 100,
            default_period: "30d".to_string(),
        }
    }
}

impl RankingConfig {
    /// Parsed default lookback period.
    pub fn period(&self) -> Result<LookbackPeriod> {
        self.default_period
            .parse()
            .with_context(|| format!("Invalid ranking.default_period: {}", self.default_period))
    }

    /// Clamp a requested top-N to the configured maximum.
    pub fn clamp_top_n(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_top_n).min(self.max_top_n)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ForecastSection {
    pub lookback_days: i64,
    pub horizon_days: i64,
    pub min_points: usize,
    pub stable_slope_ratio: f64,
    pub flat_confidence: f64,
    pub sampling_interval_days: f64,
    pub density_half_saturation: f64,
}

impl Default for ForecastSection {
    fn default() -> Self {
        let d = ForecastConfig::default();
        Self {
            lookback_days: d.lookback_days,
            horizon_days: d.horizon_days,
            min_points: d.min_points,
            stable_slope_ratio: d.stable_slope_ratio,
            flat_confidence: d.flat_confidence,
            sampling_interval_days: d.sampling_interval_days,
            density_half_saturation: d.density_half_saturation,
        }
    }
}

impl From<&ForecastSection> for ForecastConfig {
    fn from(s: &ForecastSection) -> Self {
        ForecastConfig {
            lookback_days: s.lookback_days,
            horizon_days: s.horizon_days,
            min_points: s.min_points,
            stable_slope_ratio: s.stable_slope_ratio,
            flat_confidence: s.flat_confidence.clamp(0.0, 1.0),
            sampling_interval_days: s.sampling_interval_days,
            density_half_saturation: s.density_half_saturation,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        self.ranking.period()?;
        if self.forecast.lookback_days <= 0 {
            anyhow::bail!("forecast.lookback_days must be positive");
        }
        if self.forecast.horizon_days < 0 {
            anyhow::bail!("forecast.horizon_days must not be negative");
        }
        if self.forecast.sampling_interval_days <= 0.0 {
            anyhow::bail!("forecast.sampling_interval_days must be positive");
        }
        Ok(())
    }

    pub fn forecast_config(&self) -> ForecastConfig {
        ForecastConfig::from(&self.forecast)
    }
}

//! Price analytics engine for collectible price histories.
//!
//! Turns an irregular series of price observations into trend, volatility
//! and activity metrics, ranked top-N views, and a forward price forecast
//! with a confidence score. Every engine function is pure and synchronous.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod series;
pub mod metrics;
pub mod ranking;
pub mod forecast;
pub mod api;

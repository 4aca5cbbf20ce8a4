//! Integration tests for the analytics engine.
//!
//! Drives the public library API with literal fixture data: series
//! normalisation, metrics, ranking and forecasting end to end.

mod fixtures;
mod properties;
mod scenarios;

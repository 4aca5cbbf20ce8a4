//! Snapshot series.
//!
//! Turns a raw, unordered, possibly duplicated batch of observations into
//! the canonical series: one item and condition, one currency, ascending
//! unique timestamps.

use tracing::debug;

use crate::types::{AnalyticsError, PriceObservation, SeriesKey, Window};

/// Time-ordered price history for one (item, condition) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    key: SeriesKey,
    currency: Option<String>,
    points: Vec<PriceObservation>,
}

impl Series {
    /// Normalise raw observations into a series for `key`.
    ///
    /// Sorting is stable. When two observations share a timestamp, the one
    /// appearing later in the input wins.
    pub fn from_observations(
        key: SeriesKey,
        observations: Vec<PriceObservation>,
    ) -> Result<Self, AnalyticsError> {
        let mut currency: Option<String> = None;

        for obs in &observations {
            if !obs.belongs_to(&key) {
                return Err(AnalyticsError::MalformedSeries(format!(
                    "observation for {} [{}] in series {key}",
                    obs.item_id, obs.condition
                )));
            }
            if obs.price_cents <= 0 {
                return Err(AnalyticsError::MalformedSeries(format!(
                    "non-positive price {}¢ at {} in series {key}",
                    obs.price_cents, obs.timestamp
                )));
            }
            if let Some(c) = &currency {
                if *c != obs.currency {
                    return Err(AnalyticsError::MalformedSeries(format!(
                        "mixed currencies {c} and {} in series {key}",
                        obs.currency
                    )));
                }
            } else {
                currency = Some(obs.currency.clone());
            }
        }

        let raw_len = observations.len();
        let mut sorted = observations;
        sorted.sort_by_key(|o| o.timestamp);

        // Stable sort keeps input order within a timestamp, so the last one wins.
        let mut points: Vec<PriceObservation> = Vec::with_capacity(sorted.len());
        for obs in sorted {
            match points.last_mut() {
                Some(last) if last.timestamp == obs.timestamp => *last = obs,
                _ => points.push(obs),
            }
        }

        if points.len() < raw_len {
            debug!(
                series = %key,
                raw = raw_len,
                kept = points.len(),
                "Collapsed duplicate timestamps"
            );
        }

        Ok(Self {
            key,
            currency,
            points,
        })
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    /// Currency shared by every observation, `None` for an empty series.
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn points(&self) -> &[PriceObservation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.points.last()
    }

    /// The contiguous slice of observations inside `window` (inclusive).
    pub fn window(&self, window: &Window) -> &[PriceObservation] {
        let lo = self.points.partition_point(|o| o.timestamp < window.start);
        let hi = self.points.partition_point(|o| o.timestamp <= window.end);
        if lo >= hi {
            &[]
        } else {
            &self.points[lo..hi]
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn key() -> SeriesKey {
        SeriesKey::new("pikachu-illustrator", "graded_psa_9")
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn obs(n: i64, price: i64) -> PriceObservation {
        PriceObservation::new(&key(), day(n), price)
    }

    #[test]
    fn test_sorts_ascending() {
        let series =
            Series::from_observations(key(), vec![obs(5, 300), obs(1, 100), obs(3, 200)]).unwrap();
        let prices: Vec<i64> = series.points().iter().map(|o| o.price_cents).collect();
        assert_eq!(prices, vec![100, 200, 300]);
        assert_eq!(series.latest().unwrap().price_cents, 300);
    }

    #[test]
    fn test_duplicate_timestamp_last_write_wins() {
        let series = Series::from_observations(
            key(),
            vec![obs(2, 111), obs(1, 50), obs(2, 222), obs(2, 333)],
        )
        .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].price_cents, 333);
    }

    #[test]
    fn test_rejects_mixed_items() {
        let stranger = PriceObservation::new(&SeriesKey::new("other", "graded_psa_9"), day(0), 10);
        let err = Series::from_observations(key(), vec![obs(1, 100), stranger]).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedSeries(_)));
    }

    #[test]
    fn test_rejects_mixed_conditions() {
        let other = PriceObservation::new(&SeriesKey::new("pikachu-illustrator", "raw"), day(0), 10);
        let err = Series::from_observations(key(), vec![other]).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedSeries(_)));
    }

    #[test]
    fn test_rejects_mixed_currency() {
        let eur = obs(2, 100).with_currency("EUR");
        let err = Series::from_observations(key(), vec![obs(1, 100), eur]).unwrap_err();
        assert!(err.to_string().contains("mixed currencies"));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let err = Series::from_observations(key(), vec![obs(1, 0)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedSeries(_)));
    }

    #[test]
    fn test_empty_series_is_valid() {
        let series = Series::from_observations(key(), Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.currency(), None);
        assert!(series.latest().is_none());
    }

    #[test]
    fn test_window_slice_inclusive() {
        let series = Series::from_observations(
            key(),
            (0..10).map(|n| obs(n, 100 + n)).collect(),
        )
        .unwrap();
        let w = Window::new(day(2), day(5)).unwrap();
        let slice = series.window(&w);
        assert_eq!(slice.len(), 4);
        assert_eq!(slice[0].price_cents, 102);
        assert_eq!(slice[3].price_cents, 105);

        let empty = Window::new(day(20), day(30)).unwrap();
        assert!(series.window(&empty).is_empty());
    }
}

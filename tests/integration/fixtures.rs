//! Fixture builders shared by the integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use price_analytics::series::Series;
use price_analytics::types::{PriceObservation, SeriesKey};

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn day(n: i64) -> DateTime<Utc> {
    epoch() + Duration::days(n)
}

pub fn key(item: &str) -> SeriesKey {
    SeriesKey::new(item, "near_mint")
}

/// Series from `(day, cents)` pairs.
pub fn series(item: &str, points: &[(i64, i64)]) -> Series {
    let k = key(item);
    let obs = points
        .iter()
        .map(|&(d, p)| PriceObservation::new(&k, day(d), p))
        .collect();
    Series::from_observations(k, obs).unwrap()
}

/// Deterministic pseudo-random price walks for property checks.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    /// Uniform in `[lo, hi]`.
    pub fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }
}

/// A random series of `len` points with strictly increasing days,
/// spanning at most 12 days per step.
pub fn random_series(item: &str, rng: &mut Lcg, len: usize) -> Series {
    let mut d = 0;
    let mut price = rng.range(100, 10_000);
    let points: Vec<(i64, i64)> = (0..len)
        .map(|_| {
            d += rng.range(1, 12);
            price = (price + rng.range(-300, 300)).max(1);
            (d, price)
        })
        .collect();
    series(item, &points)
}

//! Ordinary least-squares line fit.

/// Result of fitting `y = intercept + slope × x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. `None` when `y` has zero variance.
    pub r_squared: Option<f64>,
    pub mean_y: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a least-squares line through `(xs[i], ys[i])`.
///
/// Returns `None` for fewer than two points or mismatched lengths.
/// If every `x` is identical the slope is zero and the intercept is the mean of `y`.
pub fn fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }

    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let r_squared = if syy > 0.0 {
        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| (y - (intercept + slope * x)).powi(2))
            .sum();
        Some((1.0 - ss_res / syy).clamp(0.0, 1.0))
    } else {
        None
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        mean_y,
        n,
    })
}

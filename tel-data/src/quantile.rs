//! Empirical quantiles.

use tel_core::{EngineError, Result};

/// Inclusive linear-interpolation quantile of a sample.
///
/// With the sample sorted ascending as `x[0..n]`, the position `h = (n - 1) * p`
/// falls between order statistics `x[floor(h)]` and `x[floor(h) + 1]`, and the
/// result interpolates linearly between them. Returns `Ok(None)` for an empty
/// sample so callers can carry the threshold as undefined.
pub fn quantile<I>(sample: I, probability: f64) -> Result<Option<f64>>
where
    I: IntoIterator<Item = f64>,
{
    if !(0.0..=1.0).contains(&probability) {
        return Err(EngineError::InvalidQuantile(probability));
    }
    let mut sorted: Vec<f64> = sample.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(Some(quantile_sorted(&sorted, probability)))
}

/// Quantile of an already sorted, non-empty, finite sample.
pub(crate) fn quantile_sorted(sorted: &[f64], probability: f64) -> f64 {
    let last = sorted.len() - 1;
    let h = last as f64 * probability;
    let lower = h.floor() as usize;
    if lower >= last {
        return sorted[last];
    }
    let fraction = h - lower as f64;
    sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
}

/// Several quantiles of one sample, sorting it only once.
pub fn quantiles<I>(sample: I, probabilities: &[f64]) -> Result<Vec<Option<f64>>>
where
    I: IntoIterator<Item = f64>,
{
    if let Some(p) = probabilities.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(EngineError::InvalidQuantile(*p));
    }
    let mut sorted: Vec<f64> = sample.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(probabilities
        .iter()
        .map(|p| (!sorted.is_empty()).then(|| quantile_sorted(&sorted, *p)))
        .collect())
}

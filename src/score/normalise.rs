//! Score normalisation.

/// Guard added to the range so equal scores do not divide by zero.
pub const EPSILON: f64 = 1e-9;

/// Min-max normalisation over the whole set: `(x - min) / (max - min + EPSILON)`.
///
/// The minimum maps to 0 and the maximum to (just under) 1. When every score is equal the
/// range is 0 and every output is 0. Returns scores in input order.
pub fn minmax_normalise(raw_scores: &[f64]) -> Vec<f64> {
    let Some((min, max)) = bounds(raw_scores) else {
        return Vec::new();
    };
    if max - min == 0.0 {
        tracing::warn!(n = raw_scores.len(), value = min, "all composite scores are equal");
    }
    let range = max - min + EPSILON;
    raw_scores.iter().map(|&x| (x - min) / range).collect()
}

fn bounds(xs: &[f64]) -> Option<(f64, f64)> {
    let first = *xs.first()?;
    Some(
        xs.iter()
            .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))),
    )
}

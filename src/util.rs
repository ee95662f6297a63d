use crate::error::{Error, Result};

#[inline]
pub(crate) fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Check that `data` is a non-empty rectangular matrix and return `(rows, cols)`.
pub(crate) fn check_rectangular(data: &[Vec<f64>]) -> Result<(usize, usize)> {
    let n = data.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    let d = data[0].len();
    for row in data.iter().skip(1) {
        if row.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: row.len(),
            });
        }
    }
    Ok((n, d))
}

/// Column-wise mean of a rectangular matrix with `d` columns.
pub(crate) fn column_means(data: &[Vec<f64>], d: usize) -> Vec<f64> {
    let mut means = vec![0.0; d];
    if data.is_empty() {
        return means;
    }
    for row in data {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x;
        }
    }
    let n = data.len() as f64;
    for m in &mut means {
        *m /= n;
    }
    means
}

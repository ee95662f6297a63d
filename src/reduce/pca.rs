use crate::error::{Error, Result};
use crate::features::Scaling;
use crate::util;

/// Sweep limit for the Jacobi eigensolver. Convergence is quadratic; a few sweeps are typical.
const MAX_SWEEPS: usize = 64;

/// Two-component principal component analysis.
#[derive(Debug, Clone, Default)]
pub struct Pca {
    scaling: Scaling,
}

/// Result of fitting [`Pca`].
#[derive(Debug, Clone)]
pub struct PcaFit {
    /// Column means removed before projection.
    pub mean: Vec<f64>,
    /// The two principal axes, each of unit length.
    pub components: [Vec<f64>; 2],
    /// Variance along each axis (eigenvalues of the covariance matrix).
    pub explained_variance: [f64; 2],
    /// Total variance (trace of the covariance matrix).
    pub total_variance: f64,
    /// Per-row coordinates in component space.
    pub coords: Vec<[f64; 2]>,
}

impl PcaFit {
    /// Fraction of the total variance captured by each axis. Zero for constant data.
    pub fn explained_variance_ratio(&self) -> [f64; 2] {
        if self.total_variance > 0.0 {
            self.explained_variance.map(|v| v / self.total_variance)
        } else {
            [0.0, 0.0]
        }
    }
}

impl Pca {
    /// Create a PCA reducer that centers but does not scale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set column preprocessing. Centering always happens.
    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Fit on a rectangular matrix and project every row.
    ///
    /// Returns [`Error::InsufficientData`] for fewer than 2 rows or 2 columns.
    #[tracing::instrument(level = "debug", skip_all, fields(rows = data.len()))]
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<PcaFit> {
        let (n, d) = match util::check_rectangular(data) {
            Ok(shape) => shape,
            Err(Error::EmptyInput) => return Err(Error::InsufficientData { rows: 0, cols: 0 }),
            Err(e) => return Err(e),
        };
        if n < 2 || d < 2 {
            return Err(Error::InsufficientData { rows: n, cols: d });
        }

        let mean = util::column_means(data, d);
        let mut centered: Vec<Vec<f64>> = data
            .iter()
            .map(|row| row.iter().zip(&mean).map(|(x, m)| x - m).collect())
            .collect();
        self.scaling.apply(&mut centered);

        let cov = covariance(&centered, d);
        let total_variance: f64 = (0..d).map(|i| cov[i][i]).sum();
        let (eigenvalues, eigenvectors) = symmetric_eigen(cov);

        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let components = [
            oriented_column(&eigenvectors, order[0]),
            oriented_column(&eigenvectors, order[1]),
        ];
        let explained_variance = [
            eigenvalues[order[0]].max(0.0),
            eigenvalues[order[1]].max(0.0),
        ];

        let coords: Vec<[f64; 2]> = centered
            .iter()
            .map(|row| [dot(row, &components[0]), dot(row, &components[1])])
            .collect();

        tracing::debug!(
            pc1 = explained_variance[0],
            pc2 = explained_variance[1],
            total = total_variance,
            "pca fitted"
        );

        Ok(PcaFit {
            mean,
            components,
            explained_variance,
            total_variance,
            coords,
        })
    }

    /// Fit and return only the per-row coordinates.
    pub fn fit_transform(&self, data: &[Vec<f64>]) -> Result<Vec<[f64; 2]>> {
        Ok(self.fit(data)?.coords)
    }
}

/// Sample covariance `XᵀX / (n - 1)` of an already-centered matrix.
fn covariance(centered: &[Vec<f64>], d: usize) -> Vec<Vec<f64>> {
    let mut cov = vec![vec![0.0; d]; d];
    for row in centered {
        for i in 0..d {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            for j in i..d {
                cov[i][j] += xi * row[j];
            }
        }
    }
    let denom = (centered.len() - 1) as f64;
    for i in 0..d {
        for j in i..d {
            cov[i][j] /= denom;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and a matrix whose columns are the matching unit eigenvectors.
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v = vec![vec![0.0; n]; n];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum();
    if scale == 0.0 {
        return (vec![0.0; n], v);
    }

    for sweep in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off <= 1e-24 * scale {
            tracing::trace!(sweep, "jacobi converged");
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                // Rotation angle chosen so the (p, q) entry vanishes.
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}

/// Extract column `j` and flip it so its largest-magnitude entry is positive.
fn oriented_column(m: &[Vec<f64>], j: usize) -> Vec<f64> {
    let mut col: Vec<f64> = m.iter().map(|row| row[j]).collect();
    let pivot = col
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        for x in &mut col {
            *x = -*x;
        }
    }
    col
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

//! K-means with k-means++ seeding and Lloyd iterations.
//!
//! # The Algorithm (Lloyd, 1982; Arthur & Vassilvitskii, 2007)
//!
//! 1. **Seeding (k-means++)**: pick the first centroid uniformly at random, then each further
//!    centroid with probability proportional to its squared distance to the nearest centroid
//!    chosen so far. Seeds end up spread across the data.
//! 2. **Assignment**: every point joins its nearest centroid (squared Euclidean distance).
//! 3. **Update**: every centroid moves to the mean of its members.
//! 4. Repeat 2–3 until no centroid moves more than `tol`, or `max_iter` rounds have run.
//!
//! ## Empty clusters
//!
//! A cluster can lose every member, most obviously when the data has fewer distinct points
//! than `k`. Its centroid is then left where it was for that round; the label space stays
//! `0..k` and some labels simply go unused.
//!
//! ## Determinism
//!
//! Seeding is random. With [`Kmeans::with_seed`] the whole fit is reproducible; without it,
//! two fits on the same data may number (and occasionally shape) clusters differently.

use rand::prelude::*;

use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::util::{self, squared_euclidean};

/// K-means clusterer.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
}

/// Output of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Final centroids, one per cluster id.
    pub centroids: Vec<Vec<f64>>,
    /// Cluster id per input row, in `0..k`.
    pub labels: Vec<usize>,
    /// Number of members per cluster id.
    pub sizes: Vec<usize>,
    /// Sum of squared distances from each row to its centroid.
    pub inertia: f64,
    /// Lloyd rounds executed.
    pub n_iter: usize,
    /// Whether the centroid shift dropped below tolerance before `max_iter`.
    pub converged: bool,
}

impl KmeansFit {
    /// Number of cluster ids with no members.
    pub fn empty_clusters(&self) -> usize {
        self.sizes.iter().filter(|&&s| s == 0).count()
    }
}

impl Kmeans {
    /// Create a k-means clusterer with `k` clusters.
    ///
    /// Defaults: `max_iter = 100`, `tol = 1e-6`, unseeded.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-6,
            seed: None,
        }
    }

    /// Set the maximum number of Lloyd rounds.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the largest centroid movement (Euclidean).
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Seed the k-means++ initialization for reproducible fits.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set or clear the seed.
    pub fn with_seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.tol.is_nan() || self.tol < 0.0 {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be non-negative",
            });
        }
        Ok(())
    }

    /// Fit on a rectangular matrix.
    ///
    /// `k` may exceed the number of distinct rows; the surplus clusters come back empty.
    #[tracing::instrument(level = "debug", skip_all, fields(k = self.k, rows = data.len()))]
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KmeansFit> {
        let (n, d) = util::check_rectangular(data)?;
        if self.k == 0 {
            return Err(Error::InvalidClusterCount {
                requested: 0,
                n_items: n,
            });
        }
        self.validate()?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut centroids = plus_plus_init(data, self.k, &mut rng);
        let mut labels = vec![0usize; n];
        let mut sizes = vec![0usize; self.k];
        let mut n_iter = 0;
        let mut converged = false;

        while n_iter < self.max_iter {
            n_iter += 1;

            for (label, point) in labels.iter_mut().zip(data) {
                *label = nearest(point, &centroids).0;
            }

            let mut sums = vec![vec![0.0; d]; self.k];
            sizes.iter_mut().for_each(|s| *s = 0);
            for (point, &c) in data.iter().zip(&labels) {
                sizes[c] += 1;
                for (acc, x) in sums[c].iter_mut().zip(point) {
                    *acc += x;
                }
            }

            let mut max_shift = 0.0f64;
            for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&sizes) {
                if count == 0 {
                    continue;
                }
                let inv = 1.0 / count as f64;
                let updated: Vec<f64> = sum.into_iter().map(|s| s * inv).collect();
                max_shift = max_shift.max(squared_euclidean(centroid, &updated).sqrt());
                *centroid = updated;
            }

            if max_shift < self.tol {
                converged = true;
                break;
            }
        }

        let inertia = data
            .iter()
            .zip(&labels)
            .map(|(p, &c)| squared_euclidean(p, &centroids[c]))
            .sum();

        let fit = KmeansFit {
            centroids,
            labels,
            sizes,
            inertia,
            n_iter,
            converged,
        };

        let empty = fit.empty_clusters();
        if empty > 0 {
            tracing::warn!(empty, "k-means finished with empty clusters");
        }
        tracing::debug!(n_iter, converged, inertia = fit.inertia, "k-means fitted");
        Ok(fit)
    }
}

impl Default for Kmeans {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

/// Index of, and squared distance to, the nearest centroid. Ties go to the lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let dist = squared_euclidean(point, c);
        if dist < best.1 {
            best = (i, dist);
        }
    }
    best
}

/// k-means++ seeding.
///
/// When every remaining point coincides with a chosen seed (total weight 0), the next seed is
/// drawn uniformly, which yields duplicate centroids and therefore empty clusters.
fn plus_plus_init<R: Rng + ?Sized>(data: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..n)].clone());

    let mut dist2: Vec<f64> = data
        .iter()
        .map(|p| squared_euclidean(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = dist2.iter().sum();
        let next = if total > 0.0 && total.is_finite() {
            weighted_index(&dist2, rng.random::<f64>() * total).unwrap_or(n - 1)
        } else {
            rng.random_range(0..n)
        };

        let seed = data[next].clone();
        for (dd, p) in dist2.iter_mut().zip(data) {
            *dd = dd.min(squared_euclidean(p, &seed));
        }
        centroids.push(seed);
    }
    centroids
}

/// Index whose cumulative weight first exceeds `target`. Zero-weight entries are never chosen.
///
/// Rounding can leave `target` past the final cumulative sum; the last positive weight wins then.
fn weighted_index(weights: &[f64], mut target: f64) -> Option<usize> {
    for (i, &w) in weights.iter().enumerate() {
        if target < w {
            return Some(i);
        }
        target -= w;
    }
    weights.iter().rposition(|&w| w > 0.0)
}

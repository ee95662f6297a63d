//! Dimensionality reduction for the scatter view.
//!
//! ## PCA
//!
//! Principal component analysis finds the orthogonal directions along which the centered data
//! varies most. Projecting onto the top two gives a 2-D layout that preserves as much of the
//! spread as a linear map can.
//!
//! **Objective**: for the centered matrix `X` with covariance `C = XᵀX / (n - 1)`, the
//! components are the leading eigenvectors of `C`:
//!
//! ```text
//! C v_i = λ_i v_i,   λ_1 ≥ λ_2 ≥ …
//! ```
//!
//! **Caveats**:
//! - Columns are not scaled by default, so high-variance (large-magnitude) columns dominate.
//!   Use [`crate::features::Scaling::Standardize`] to weigh columns equally.
//! - Eigenvectors are defined up to sign. This crate orients each component so its
//!   largest-magnitude loading is positive, but callers should not rely on a particular sign.
//!
//! ## Usage
//!
//! ```rust
//! use sift::reduce::Pca;
//!
//! let data = vec![
//!     vec![0.0, 0.0, 1.0],
//!     vec![1.0, 1.0, 1.0],
//!     vec![2.0, 2.0, 1.0],
//!     vec![3.0, 3.0, 1.0],
//! ];
//! let coords = Pca::new().fit_transform(&data).unwrap();
//! assert_eq!(coords.len(), 4);
//! // All the variance lies on one axis.
//! assert!(coords.iter().all(|c| c[1].abs() < 1e-9));
//! ```

mod pca;

pub use pca::{Pca, PcaFit};

use thiserror::Error;

/// Errors returned by the analysis pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count cannot be used.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Rows of a feature matrix have inconsistent widths.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// The matrix is too small for a two-component projection.
    #[error("insufficient data: PCA needs at least 2 rows and 2 columns, got {rows}x{cols}")]
    InsufficientData {
        /// Number of rows supplied.
        rows: usize,
        /// Number of columns supplied.
        cols: usize,
    },

    /// A loaded record could not be interpreted.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Malformed JSON handed to the loader.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Result alias for `sunder`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by matrix construction and clustering entry points.
///
/// Numeric degeneracies met during a run (zero rows, zero denominators in the
/// power iteration or the conductance ratio) are not errors; they are absorbed
/// where they occur.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Row or vector length mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// A row index outside the matrix was referenced.
    #[error("row index {index} out of bounds for {rows} rows")]
    RowOutOfBounds {
        /// Offending index.
        index: usize,
        /// Number of rows available.
        rows: usize,
    },

    /// The requested output is not defined for this algorithm or data.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

//! Error types for syzygy-view
//!
//! Every failure in this crate is a deterministic function of its inputs, so
//! errors carry enough context to tell the caller which input was wrong.

use thiserror::Error;

/// Main error type for derived-geometry computations
#[derive(Error, Debug)]
pub enum ViewError {
    /// A limb darkening model tag that is not recognized
    #[error("Invalid limb darkening model: {0}")]
    InvalidModel(String),

    /// A limb darkening model that is recognized but has no intensity law
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A value outside the domain of a formula
    #[error("Domain error: {0}")]
    Domain(String),

    /// The face-on search never found a sample on the near side of the orbit
    #[error("Degenerate orbit: {0}")]
    DegenerateOrbit(String),

    /// Normalization over a range of zero width
    #[error("Degenerate range: {0}")]
    DegenerateRange(String),

    /// Two arrays that must be sample-aligned have different lengths
    #[error("Array length mismatch: {name} has {actual} samples, expected {expected}")]
    ShapeMismatch {
        /// The array that did not match
        name: &'static str,
        /// The expected sample count
        expected: usize,
        /// The sample count that was found
        actual: usize,
    },

    /// An operation received no samples
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A sample index past the end of the trajectory
    #[error("Index {index} out of range for {len} samples")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The number of samples available
        len: usize,
    },

    /// A scalar query parameter outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error when a file I/O operation fails
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when a JSON document cannot be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for syzygy-view operations
pub type Result<T> = std::result::Result<T, ViewError>;

/// Fails with [`ViewError::ShapeMismatch`] unless `actual == expected`
pub(crate) fn ensure_len(name: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(ViewError::ShapeMismatch {
            name,
            expected,
            actual,
        })
    }
}

/// Fails with [`ViewError::EmptyInput`] when `len` is zero
pub(crate) fn ensure_non_empty(what: &str, len: usize) -> Result<()> {
    if len == 0 {
        Err(ViewError::EmptyInput(format!("{} has no samples", what)))
    } else {
        Ok(())
    }
}

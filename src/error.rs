//! Error types for compression operations.

use thiserror::Error;

/// Errors that can occur while compressing an image.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// The input matrix or image is malformed (empty axes, non-finite
    /// values, or a rank outside the factorization's bounds).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The requested savings target is outside the open interval (0, 1).
    /// A non-positive target is trivially met at rank 1 and a target of 1
    /// or more is unachievable at any rank.
    #[error("invalid configuration: target savings {target} is outside (0, 1)")]
    InvalidConfiguration { target: f64 },

    /// The underlying SVD routine failed to converge. Deterministic for a
    /// given input, so never retried internally.
    #[error("numerical failure: {message}")]
    NumericalFailure { message: String },
}

// Rank-constrained SVD image compression

#![doc = include_str!("../README.md")]

pub mod compress;
pub mod error;
pub mod labels;
pub mod rank;
pub mod svd;

pub use compress::{approximate_at_rank, compress};
pub use error::CompressionError;
pub use labels::LabelMap;
pub use rank::{savings_curve, select_rank, space_savings};
pub use svd::{decompose, Factorization};

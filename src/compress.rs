//! Per-channel compression and reassembly of whole images.

use log::debug;
use ndarray::{Array2, Array3, ArrayView3, Axis};
use rayon::prelude::*;

use crate::error::CompressionError;
use crate::rank::{select_rank, space_savings};
use crate::svd::decompose;

fn validate_shape(image: &ArrayView3<f64>) -> Result<(), CompressionError> {
    let (n_rows, n_cols, n_channels) = image.dim();
    if n_rows == 0 || n_cols == 0 || n_channels == 0 {
        return Err(CompressionError::InvalidInput {
            message: format!(
                "image has an empty axis: {}x{}x{}",
                n_rows, n_cols, n_channels
            ),
        });
    }
    Ok(())
}

/// Compresses an `H×W×C` image by rank-truncating each channel's SVD at the
/// largest rank that still meets `target_savings`.
///
/// Channels carry no data dependency on each other, so they are factored and
/// reconstructed in parallel; the rank search runs independently per channel.
/// Returns the reassembled image (identical shape to the input) together
/// with the arithmetic mean of the per-channel savings fractions actually
/// achieved.
///
/// Reconstructed values are not clamped back into `[0, 1]`; truncation error
/// can overshoot the input range slightly.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidConfiguration`] for a target outside
/// (0, 1), [`CompressionError::InvalidInput`] for an empty or non-finite
/// image, and [`CompressionError::NumericalFailure`] if a channel's SVD does
/// not converge.
///
/// # Examples
///
/// ```
/// use lowrank_image::compress;
/// use ndarray::Array3;
///
/// let image = Array3::<f64>::from_elem((16, 16, 3), 0.25);
/// let (compressed, achieved) = compress(image.view(), 0.4).unwrap();
/// assert_eq!(compressed.dim(), (16, 16, 3));
/// assert!(achieved > 0.4);
/// ```
pub fn compress(
    image: ArrayView3<f64>,
    target_savings: f64,
) -> Result<(Array3<f64>, f64), CompressionError> {
    if !(target_savings > 0.0 && target_savings < 1.0) {
        return Err(CompressionError::InvalidConfiguration {
            target: target_savings,
        });
    }
    validate_shape(&image)?;
    let (n_rows, n_cols, n_channels) = image.dim();

    let per_channel: Vec<(Array2<f64>, f64)> = (0..n_channels)
        .into_par_iter()
        .map(|c| {
            let channel = image.index_axis(Axis(2), c);
            let factorization = decompose(channel)?;
            let rank = select_rank(&factorization, n_rows, n_cols, target_savings)?;
            let achieved = space_savings(rank, n_rows, n_cols);
            debug!(
                "channel {}: rank {} of {}, savings {:.4} (target {:.4})",
                c,
                rank,
                factorization.max_rank(),
                achieved,
                target_savings
            );
            Ok((factorization.reconstruct(rank)?, achieved))
        })
        .collect::<Result<_, CompressionError>>()?;

    let mut compressed = Array3::<f64>::zeros(image.raw_dim());
    let mut savings_total = 0.0;
    for (c, (channel, achieved)) in per_channel.into_iter().enumerate() {
        compressed.index_axis_mut(Axis(2), c).assign(&channel);
        savings_total += achieved;
    }
    Ok((compressed, savings_total / n_channels as f64))
}

/// Rebuilds every channel of an `H×W×C` image from the leading `rank`
/// singular components, skipping the rank search.
///
/// Useful for sweeping fixed ranks against image quality; `rank` must lie in
/// `[1, min(H, W)]`.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidInput`] for an empty or non-finite
/// image or an out-of-range rank, and
/// [`CompressionError::NumericalFailure`] if a channel's SVD does not
/// converge.
pub fn approximate_at_rank(
    image: ArrayView3<f64>,
    rank: usize,
) -> Result<Array3<f64>, CompressionError> {
    validate_shape(&image)?;
    let (_, _, n_channels) = image.dim();

    let channels: Vec<Array2<f64>> = (0..n_channels)
        .into_par_iter()
        .map(|c| {
            let factorization = decompose(image.index_axis(Axis(2), c))?;
            factorization.reconstruct(rank)
        })
        .collect::<Result<_, CompressionError>>()?;

    let mut approximated = Array3::<f64>::zeros(image.raw_dim());
    for (c, channel) in channels.into_iter().enumerate() {
        approximated.index_axis_mut(Axis(2), c).assign(&channel);
    }
    Ok(approximated)
}

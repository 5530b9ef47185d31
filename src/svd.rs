//! Singular value decomposition of a single image channel.

use ndarray::{s, Array1, Array2, ArrayView2};
use ndarray_linalg::svd::SVD;

use crate::error::CompressionError;

/// The thin SVD of one channel matrix: `U · diag(σ) · Vᵗ` reconstructs the
/// input up to floating-point tolerance.
///
/// With `k = min(n_rows, n_cols)`, `U` is `n_rows×k` with orthonormal
/// columns, the singular values are non-negative and sorted descending, and
/// `Vᵗ` is `k×n_cols` with orthonormal rows. The factorization is never
/// mutated after creation.
#[derive(Debug, Clone)]
pub struct Factorization {
    u: Array2<f64>,
    singular_values: Array1<f64>,
    vt: Array2<f64>,
}

impl Factorization {
    /// The left singular vectors, shape `(n_rows, max_rank)`.
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    /// The singular values, non-negative and descending, length `max_rank`.
    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    /// The right singular vectors, shape `(max_rank, n_cols)`.
    pub fn vt(&self) -> &Array2<f64> {
        &self.vt
    }

    /// Number of singular components, `min(n_rows, n_cols)`.
    pub fn max_rank(&self) -> usize {
        self.singular_values.len()
    }

    /// Rebuilds the channel from the leading `rank` components: `U` is
    /// truncated to its first `rank` columns, `σ` to its first `rank`
    /// entries, `Vᵗ` to its first `rank` rows, and the product is formed.
    ///
    /// At `rank == max_rank` this reproduces the original channel up to
    /// numerical tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`CompressionError::InvalidInput`] if `rank` is zero or
    /// exceeds [`max_rank`](Self::max_rank).
    pub fn reconstruct(&self, rank: usize) -> Result<Array2<f64>, CompressionError> {
        if rank == 0 || rank > self.max_rank() {
            return Err(CompressionError::InvalidInput {
                message: format!(
                    "rank {} is outside [1, {}] for this factorization",
                    rank,
                    self.max_rank()
                ),
            });
        }
        let u_r = self.u.slice(s![.., ..rank]);
        let sigma_r = Array2::from_diag(&self.singular_values.slice(s![..rank]));
        let vt_r = self.vt.slice(s![..rank, ..]);
        Ok(u_r.dot(&sigma_r).dot(&vt_r))
    }
}

/// Computes the thin SVD of one channel matrix.
///
/// The input must be non-empty and contain only finite values; it is
/// otherwise rejected before the (comparatively expensive) factorization
/// runs. Deterministic for a fixed input.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidInput`] for an empty or non-finite
/// matrix, and [`CompressionError::NumericalFailure`] if the LAPACK routine
/// does not converge.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use lowrank_image::decompose;
///
/// let channel = array![[1.0, 0.0, 0.5], [0.2, 0.9, 0.4]];
/// let factorization = decompose(channel.view()).unwrap();
/// assert_eq!(factorization.max_rank(), 2);
///
/// let rebuilt = factorization.reconstruct(2).unwrap();
/// for (a, b) in channel.iter().zip(rebuilt.iter()) {
///     assert!((a - b).abs() < 1e-10);
/// }
/// ```
pub fn decompose(channel: ArrayView2<f64>) -> Result<Factorization, CompressionError> {
    let (n_rows, n_cols) = channel.dim();
    if n_rows == 0 || n_cols == 0 {
        return Err(CompressionError::InvalidInput {
            message: format!("channel matrix has an empty axis: {}x{}", n_rows, n_cols),
        });
    }
    if channel.iter().any(|v| !v.is_finite()) {
        return Err(CompressionError::InvalidInput {
            message: "channel matrix contains non-finite values".to_string(),
        });
    }

    let (u, singular_values, vt) =
        channel
            .svd(true, true)
            .map_err(|e| CompressionError::NumericalFailure {
                message: format!("SVD did not converge: {}", e),
            })?;
    let u = u.ok_or_else(|| CompressionError::NumericalFailure {
        message: "SVD did not return U".to_string(),
    })?;
    let vt = vt.ok_or_else(|| CompressionError::NumericalFailure {
        message: "SVD did not return Vt".to_string(),
    })?;

    // LAPACK hands back full square factors; keep the thin ones.
    let k = singular_values.len();
    let u = u.slice_move(s![.., ..k]);
    let vt = vt.slice_move(s![..k, ..]);

    Ok(Factorization {
        u,
        singular_values,
        vt,
    })
}

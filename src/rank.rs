//! Storage-savings model and the rank search built on it.

use log::warn;

use crate::error::CompressionError;
use crate::svd::Factorization;

/// Fraction of storage avoided by a rank-`rank` truncated factorization of
/// an `n_rows×n_cols` matrix, relative to storing the dense matrix.
///
/// The truncated representation keeps `rank` columns of `U`, `rank` singular
/// values, and `rank` rows of `Vᵗ`:
///
/// ```text
/// savings = 1 - (n_rows*rank + rank + n_cols*rank) / (n_rows*n_cols)
/// ```
///
/// The result is strictly decreasing in `rank` and goes negative once the
/// truncated representation is larger than the dense matrix. Pure function.
///
/// # Examples
///
/// ```
/// use lowrank_image::space_savings;
///
/// assert_eq!(space_savings(1, 4, 4), 1.0 - 9.0 / 16.0);
/// assert!(space_savings(2, 4, 4) < space_savings(1, 4, 4));
/// ```
pub fn space_savings(rank: usize, n_rows: usize, n_cols: usize) -> f64 {
    let original_space = (n_rows * n_cols) as f64;
    let compressed_space = (n_rows * rank + rank + n_cols * rank) as f64;
    1.0 - compressed_space / original_space
}

/// The rank-vs-savings curve for an `n_rows×n_cols` matrix, one entry per
/// rank in `[1, min(n_rows, n_cols)]`.
///
/// Lets diagnostic collaborators report the curve for a given image size
/// without performing a compression.
pub fn savings_curve(n_rows: usize, n_cols: usize) -> Vec<(usize, f64)> {
    let max_rank = n_rows.min(n_cols);
    (1..=max_rank)
        .map(|rank| (rank, space_savings(rank, n_rows, n_cols)))
        .collect()
}

/// Selects the largest rank whose storage savings still meet
/// `target_savings`.
///
/// `space_savings` is strictly decreasing in rank, so this is a monotone
/// boundary search: climb from rank 1 while the next rank still meets the
/// target, stop at the crossing. Savings exactly equal to the target count
/// as meeting it.
///
/// Two clamps keep the search total:
///
/// * If even rank 1 undershoots the target (possible for small matrices,
///   where a single component already costs a large fraction of the dense
///   storage), the selector clamps to rank 1 and logs a warning rather than
///   failing.
/// * The climb never advances past `factorization.max_rank()`.
///
/// # Errors
///
/// Returns [`CompressionError::InvalidConfiguration`] if `target_savings`
/// is outside the open interval (0, 1), and
/// [`CompressionError::InvalidInput`] for an empty factorization or
/// dimensions that do not match it.
pub fn select_rank(
    factorization: &Factorization,
    n_rows: usize,
    n_cols: usize,
    target_savings: f64,
) -> Result<usize, CompressionError> {
    if !(target_savings > 0.0 && target_savings < 1.0) {
        return Err(CompressionError::InvalidConfiguration {
            target: target_savings,
        });
    }
    let max_rank = factorization.max_rank();
    if max_rank == 0 {
        return Err(CompressionError::InvalidInput {
            message: "factorization has no singular components".to_string(),
        });
    }
    if max_rank != n_rows.min(n_cols) {
        return Err(CompressionError::InvalidInput {
            message: format!(
                "factorization rank {} does not match a {}x{} matrix",
                max_rank, n_rows, n_cols
            ),
        });
    }

    let mut rank = 1;
    while rank < max_rank && space_savings(rank + 1, n_rows, n_cols) >= target_savings {
        rank += 1;
    }

    if space_savings(rank, n_rows, n_cols) < target_savings {
        // Only reachable at rank 1: even the coarsest approximation costs
        // more storage than the target allows.
        warn!(
            "target savings {:.4} unachievable for a {}x{} matrix (rank 1 yields {:.4}); clamping to rank 1",
            target_savings,
            n_rows,
            n_cols,
            space_savings(1, n_rows, n_cols)
        );
    }

    Ok(rank)
}

#[cfg(test)]
mod rank_tests {
    use super::*;
    use crate::svd::decompose;
    use approx::assert_relative_eq;
    use float_cmp::approx_eq;
    use ndarray::Array2;
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random_factorization(n_rows: usize, n_cols: usize, seed: u64) -> Factorization {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let channel = Array2::from_shape_fn((n_rows, n_cols), |_| rng.gen_range(0.0..1.0));
        decompose(channel.view()).unwrap()
    }

    #[test]
    fn savings_formula_matches_closed_form() {
        assert!(approx_eq!(f64, space_savings(1, 4, 4), 1.0 - 9.0 / 16.0, ulps = 2));
        assert_relative_eq!(space_savings(25, 128, 128), 1.0 - 6425.0 / 16384.0);
        // Rank 0 is degenerate but the formula still pins it at 1.
        assert_relative_eq!(space_savings(0, 64, 64), 1.0);
    }

    #[test]
    fn savings_is_strictly_decreasing_in_rank() {
        for rank in 1..128 {
            assert!(
                space_savings(rank, 128, 128) > space_savings(rank + 1, 128, 128),
                "savings not strictly decreasing at rank {}",
                rank
            );
        }
        for rank in 1..40 {
            assert!(space_savings(rank, 200, 40) > space_savings(rank + 1, 200, 40));
        }
    }

    #[test]
    fn savings_is_a_pure_function() {
        let first = space_savings(17, 96, 80);
        let second = space_savings(17, 96, 80);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn savings_goes_negative_for_high_ranks() {
        // Full-rank truncated storage always exceeds the dense matrix.
        assert!(space_savings(128, 128, 128) < 0.0);
        assert!(space_savings(40, 200, 40) < 0.0);
    }

    #[test]
    fn curve_covers_every_rank() {
        let curve = savings_curve(48, 32);
        assert_eq!(curve.len(), 32);
        assert_eq!(curve[0].0, 1);
        assert_eq!(curve[31].0, 32);
        for window in curve.windows(2) {
            assert!(window[0].1 > window[1].1);
        }
    }

    #[test]
    fn selects_rank_25_for_128x128_at_target_0_6() {
        // 1 - 257r/16384: rank 25 gives ~0.6078, rank 26 gives ~0.5922.
        let factorization = random_factorization(128, 128, 42);
        let rank = select_rank(&factorization, 128, 128, 0.6).unwrap();
        assert_eq!(rank, 25);
        assert_relative_eq!(
            space_savings(rank, 128, 128),
            0.6078,
            epsilon = 1e-4
        );
    }

    #[test]
    fn selected_rank_sits_on_the_boundary() {
        let factorization = random_factorization(128, 128, 5);
        for &target in &[0.1, 0.25, 0.5, 0.75, 0.9] {
            let rank = select_rank(&factorization, 128, 128, target).unwrap();
            assert!(space_savings(rank, 128, 128) >= target);
            if rank < factorization.max_rank() {
                assert!(space_savings(rank + 1, 128, 128) < target);
            }
        }
    }

    #[test]
    fn rank_stays_within_bounds_across_shapes_and_targets() {
        let shapes = [(8, 8), (64, 16), (16, 64), (33, 47)];
        for (i, &(n_rows, n_cols)) in shapes.iter().enumerate() {
            let factorization = random_factorization(n_rows, n_cols, i as u64);
            for &target in &[0.05, 0.3, 0.6, 0.95] {
                let rank = select_rank(&factorization, n_rows, n_cols, target).unwrap();
                assert!(rank >= 1);
                assert!(rank <= factorization.max_rank());
            }
        }
    }

    #[test]
    fn exact_equality_target_selects_the_equal_rank() {
        // A target hit exactly still counts as met, so the search stops on
        // that rank instead of backing off below it.
        let factorization = random_factorization(128, 128, 8);
        let target = space_savings(10, 128, 128);
        let rank = select_rank(&factorization, 128, 128, target).unwrap();
        assert_eq!(rank, 10);
    }

    #[test]
    fn unachievable_target_clamps_to_rank_1() {
        // savings(1) for 128x128 is ~0.9843, below a 0.99 target.
        let factorization = random_factorization(128, 128, 13);
        let rank = select_rank(&factorization, 128, 128, 0.99).unwrap();
        assert_eq!(rank, 1);

        // A 1x1 matrix can never save anything, same clamp.
        let tiny = random_factorization(1, 1, 14);
        assert_eq!(select_rank(&tiny, 1, 1, 0.5).unwrap(), 1);
    }

    #[test]
    fn out_of_range_targets_are_rejected() {
        let factorization = random_factorization(16, 16, 21);
        for &target in &[0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let result = select_rank(&factorization, 16, 16, target);
            assert!(
                matches!(result, Err(CompressionError::InvalidConfiguration { .. })),
                "target {} should be rejected",
                target
            );
        }
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let factorization = random_factorization(16, 16, 33);
        let result = select_rank(&factorization, 32, 32, 0.5);
        assert!(matches!(
            result,
            Err(CompressionError::InvalidInput { .. })
        ));
    }
}

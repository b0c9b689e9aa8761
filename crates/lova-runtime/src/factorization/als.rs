//! Implicit-feedback alternating least squares
//!
//! Confidence-weighted ALS (Hu, Koren & Volinsky): every stored entry `r`
//! contributes a preference `p = 1` when `r > 0` with confidence
//! `c = 1 + alpha * |r|`; absent entries are preference 0 with confidence 1.
//! Each sweep solves, per row, the regularized normal equations
//! `(YᵀY + Yᵀ(C - I)Y + λI) x = YᵀCp` with a Cholesky factorization.
//! `YᵀY + λI` is shared by every row of a sweep.

use super::{AlsConfig, FactorMatrices, Factorizer};
use crate::error::{Result, RuntimeError};
use crate::matrix::CsrMatrix;
use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info};

/// Scale of the uniform factor initialization
const INIT_SCALE: f64 = 0.01;

/// Deterministic implicit ALS; identical inputs and seed give identical factors.
#[derive(Debug, Clone, Default)]
pub struct ImplicitAls {
    config: AlsConfig,
}

impl ImplicitAls {
    pub fn new(config: AlsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlsConfig {
        &self.config
    }

    fn init_factors(&self, rng: &mut StdRng, rows: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, self.config.factors), |_| {
            rng.gen::<f64>() * INIT_SCALE
        })
    }

    /// Solve every row of `interactions` against the fixed factors of the
    /// other side.
    fn solve_side(&self, interactions: &CsrMatrix, fixed: &Array2<f64>) -> Result<Array2<f64>> {
        let k = self.config.factors;
        let lambda = self.config.regularization;
        let alpha = self.config.alpha;

        let gram = fixed.t().dot(fixed);
        let mut base = DMatrix::from_fn(k, k, |i, j| gram[[i, j]]);
        for d in 0..k {
            base[(d, d)] += lambda;
        }

        let (rows, _) = interactions.shape();
        let mut solved = Array2::<f64>::zeros((rows, k));

        for row in 0..rows {
            let (cols, values) = match interactions.row(row) {
                Some((cols, values)) if !cols.is_empty() => (cols, values),
                _ => continue,
            };

            let mut a = base.clone();
            let mut b = DVector::<f64>::zeros(k);

            for (&col, &value) in cols.iter().zip(values) {
                let y = DVector::from_iterator(k, fixed.row(col).iter().copied());
                let confidence = 1.0 + alpha * value.abs();
                a.ger(confidence - 1.0, &y, &y, 1.0);
                if value > 0.0 {
                    b.axpy(confidence, &y, 1.0);
                }
            }

            let x = solve_normal_equations(a, &b)?;
            for (slot, value) in solved.row_mut(row).iter_mut().zip(x.iter()) {
                *slot = *value;
            }
        }

        Ok(solved)
    }
}

impl Factorizer for ImplicitAls {
    fn fit(&self, matrix: &CsrMatrix) -> Result<FactorMatrices> {
        let started = Instant::now();
        let (n_users, n_items) = matrix.shape();
        let transposed = matrix.transpose();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut user_factors = self.init_factors(&mut rng, n_users);
        let mut item_factors = self.init_factors(&mut rng, n_items);

        for iteration in 0..self.config.iterations {
            user_factors = self.solve_side(matrix, &item_factors)?;
            item_factors = self.solve_side(&transposed, &user_factors)?;
            debug!("ALS iteration {}/{} done", iteration + 1, self.config.iterations);
        }

        info!(
            "ALS fitted {}x{} matrix ({} entries, k={}) in {}ms",
            n_users,
            n_items,
            matrix.nnz(),
            self.config.factors,
            started.elapsed().as_millis()
        );

        FactorMatrices::new(user_factors, item_factors)
    }
}

/// Solve `a x = b` for a symmetric positive definite `a`
fn solve_normal_equations(a: DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>> {
    let n = a.nrows();
    let cholesky = Cholesky::new(a).ok_or_else(|| {
        RuntimeError::Numerical(format!(
            "{}x{} normal equations are not positive definite",
            n, n
        ))
    })?;
    Ok(cholesky.solve(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> AlsConfig {
        AlsConfig {
            factors: 4,
            regularization: 0.05,
            alpha: 2.0,
            iterations: 10,
            seed: 7,
        }
    }

    fn block_matrix() -> CsrMatrix {
        // Users 0,1 like items 0,1; users 2,3 like items 2,3
        CsrMatrix::from_triplets(
            4,
            4,
            &[
                (0, 0, 1.0),
                (0, 1, 1.0),
                (1, 0, 1.0),
                (1, 1, 1.0),
                (2, 2, 1.0),
                (2, 3, 1.0),
                (3, 2, 1.0),
                (3, 3, 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_solve_normal_equations() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 3.0]);
        let b = DVector::from_vec(vec![2.0, 5.0]);
        let x = solve_normal_equations(a, &b).unwrap();
        // 4x + 2y = 2, 2x + 3y = 5 -> x = -0.5, y = 2
        assert!((x[0] + 0.5).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_rejects_indefinite() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let result = solve_normal_equations(a, &DVector::from_vec(vec![1.0, 1.0]));
        assert!(matches!(result, Err(RuntimeError::Numerical(_))));
    }

    #[test]
    fn test_fit_shapes() {
        let als = ImplicitAls::new(small_config()).unwrap();
        let factors = als.fit(&block_matrix()).unwrap();

        assert_eq!(factors.user_factors.dim(), (4, 4));
        assert_eq!(factors.item_factors.dim(), (4, 4));
        assert!(factors.user_factors.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let als = ImplicitAls::new(small_config()).unwrap();
        let first = als.fit(&block_matrix()).unwrap();
        let second = als.fit(&block_matrix()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_observed_pairs_score_higher() {
        let als = ImplicitAls::new(small_config()).unwrap();
        let factors = als.fit(&block_matrix()).unwrap();

        let seen = factors.score(0, 1).unwrap();
        let unseen = factors.score(0, 3).unwrap();
        assert!(seen > unseen, "seen {} <= unseen {}", seen, unseen);
    }

    #[test]
    fn test_empty_rows_get_zero_factors() {
        let matrix = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0)]).unwrap();
        let als = ImplicitAls::new(small_config()).unwrap();
        let factors = als.fit(&matrix).unwrap();

        assert!(factors.user_factors.row(1).iter().all(|v| *v == 0.0));
        assert!(factors.item_factors.row(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AlsConfig {
            factors: 0,
            ..small_config()
        };
        assert!(ImplicitAls::new(config).is_err());
    }
}

//! Matrix factorization contract
//!
//! The tuner treats the factorization as an opaque, scored component: it
//! hands over a matrix and gets back two dense factor matrices. Every call
//! is a fresh fit; implementations must not carry state between calls.

mod als;

pub use als::ImplicitAls;

use crate::error::{Result, RuntimeError};
use crate::matrix::CsrMatrix;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Fits latent factors to an interaction matrix
pub trait Factorizer {
    /// Fit `matrix` (users × items) from scratch
    fn fit(&self, matrix: &CsrMatrix) -> Result<FactorMatrices>;
}

/// Result of one fit: `n_users × k` and `n_items × k` factor matrices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorMatrices {
    pub user_factors: Array2<f64>,
    pub item_factors: Array2<f64>,
}

impl FactorMatrices {
    pub fn new(user_factors: Array2<f64>, item_factors: Array2<f64>) -> Result<Self> {
        if user_factors.ncols() != item_factors.ncols() {
            return Err(RuntimeError::ShapeMismatch(format!(
                "user factors have {} columns, item factors have {}",
                user_factors.ncols(),
                item_factors.ncols()
            )));
        }
        Ok(Self {
            user_factors,
            item_factors,
        })
    }

    pub fn n_users(&self) -> usize {
        self.user_factors.nrows()
    }

    pub fn n_items(&self) -> usize {
        self.item_factors.nrows()
    }

    /// Latent dimension
    pub fn factors(&self) -> usize {
        self.user_factors.ncols()
    }

    pub fn user(&self, user: usize) -> Option<ArrayView1<'_, f64>> {
        (user < self.n_users()).then(|| self.user_factors.row(user))
    }

    pub fn item(&self, item: usize) -> Option<ArrayView1<'_, f64>> {
        (item < self.n_items()).then(|| self.item_factors.row(item))
    }

    /// Raw dot product of a user and an item vector
    pub fn score(&self, user: usize, item: usize) -> Result<f64> {
        let user_vec = self.user(user).ok_or(RuntimeError::IndexOutOfBounds {
            kind: "user",
            index: user,
            len: self.n_users(),
        })?;
        let item_vec = self.item(item).ok_or(RuntimeError::IndexOutOfBounds {
            kind: "item",
            index: item,
            len: self.n_items(),
        })?;
        Ok(user_vec.dot(&item_vec))
    }
}

/// Hyper-parameters of the implicit-feedback ALS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlsConfig {
    /// Latent dimension
    #[serde(default = "default_factors")]
    pub factors: usize,

    /// L2 penalty on every factor vector
    #[serde(default = "default_regularization")]
    pub regularization: f64,

    /// Confidence scale: `c = 1 + alpha * |r|`
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Number of alternating sweeps
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Seed of the factor initialization
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_factors() -> usize {
    64
}

fn default_regularization() -> f64 {
    0.05
}

fn default_alpha() -> f64 {
    2.0
}

fn default_iterations() -> usize {
    15
}

fn default_seed() -> u64 {
    42
}

impl Default for AlsConfig {
    fn default() -> Self {
        Self {
            factors: default_factors(),
            regularization: default_regularization(),
            alpha: default_alpha(),
            iterations: default_iterations(),
            seed: default_seed(),
        }
    }
}

impl AlsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.factors == 0 {
            return Err(RuntimeError::InvalidConfig(
                "factors must be at least 1".to_string(),
            ));
        }
        if !(self.regularization.is_finite() && self.regularization >= 0.0) {
            return Err(RuntimeError::InvalidConfig(format!(
                "regularization must be a non-negative number, got {}",
                self.regularization
            )));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(RuntimeError::InvalidConfig(format!(
                "alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

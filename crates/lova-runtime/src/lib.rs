//! Lova Runtime - Preprocessing, factorization and evaluation
//!
//! This crate turns a dataset snapshot into an interaction matrix and scores
//! factorization results against held-out interactions:
//! - `index`: dense user/item index spaces
//! - `matrix`: CSR assembly with duplicate summation
//! - `preprocess`: normalization, label decoding and per-weights rebuilds
//! - `factorization`: the fit contract and an implicit-feedback ALS
//! - `evaluator`: held-out dot-product scoring
//! - `storage`: artifact persistence

pub mod error;
pub mod evaluator;
pub mod factorization;
pub mod index;
pub mod matrix;
pub mod preprocess;
pub mod storage;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use evaluator::{DotProductEvaluator, Evaluator};
pub use factorization::{AlsConfig, FactorMatrices, Factorizer, ImplicitAls};
pub use index::{IdIndexer, IndexMap, IndexMaps};
pub use matrix::{CsrMatrix, SparseMatrixBuilder};
pub use preprocess::{PreprocessConfig, Preprocessor};
pub use storage::ArtifactStore;

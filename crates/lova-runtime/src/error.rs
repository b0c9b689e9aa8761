//! Runtime error types

use lova_core::CoreError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Error from the core aggregators
    #[error("{0}")]
    Core(#[from] CoreError),

    /// An index does not fit the matrix or factor shape
    #[error("Index out of bounds: {kind} index {index} >= {len}")]
    IndexOutOfBounds {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// Inputs that must line up have different shapes
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid factorization or preprocessing configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dataset snapshot has no interactions
    #[error("Empty dataset: nothing to preprocess")]
    EmptyDataset,

    /// No held-out row survived the id mapping
    #[error("Empty evaluation set: no held-out interaction maps to known user and item ids")]
    EmptyEvaluationSet,

    /// Evaluation produced NaN or infinity
    #[error("Non-finite evaluation score: {0}")]
    NonFiniteScore(f64),

    /// Linear solve failed inside the factorization
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

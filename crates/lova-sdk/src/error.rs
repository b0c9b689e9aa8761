//! SDK error types

use lova_core::CoreError;
use lova_runtime::RuntimeError;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// YAML configuration could not be parsed
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Runtime error outside a trial (preprocessing, persistence)
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// Rebuild, refit or evaluation of a trial failed
    #[error("Trial {number} failed: {source}")]
    TrialFailed {
        number: usize,
        #[source]
        source: RuntimeError,
    },

    /// The sampler has no more configurations to propose
    #[error("Sampler exhausted at trial {0}")]
    SamplerExhausted(usize),

    /// Every trial of the budget failed
    #[error("No successful trial out of {0}")]
    NoSuccessfulTrial(usize),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

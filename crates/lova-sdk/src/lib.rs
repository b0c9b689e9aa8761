//! Lova SDK
//!
//! High-level API for tuning interaction strength weights: configure the
//! fusion and factorization, pick a search sampler, and run the
//! rebuild → refit → evaluate loop.

pub mod builder;
pub mod config;
pub mod error;
pub mod sampler;
pub mod trial;
pub mod tuner;

// Re-export main types
pub use builder::{DefaultTuner, TunerBuilder};
pub use config::{SearchBounds, TrialErrorPolicy, TunerConfig};
pub use error::{Result, SdkError};
pub use sampler::{EnqueuedSampler, LogUniformSampler, ReplaySampler, SearchSampler, SearchSpace};
pub use trial::{TrialLog, TrialRecord, TrialState, TRIALS_FILE};
pub use tuner::{Tuner, TunerSettings, TunerState, TuningReport};

// Re-export commonly used types from dependencies
pub use lova_core::{InteractionRecord, NumericWeights, StrengthWeights};
pub use lova_runtime::{ArtifactStore, FactorMatrices, IndexMaps};

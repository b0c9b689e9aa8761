//! Lova Core - Core types and aggregators for the Lova interaction pipeline
//!
//! This crate provides the building blocks shared across the Lova workspace:
//! - Value types for raw interactions (ids, labels, numeric fields)
//! - Strength weights and the columnar interaction table
//! - Pure aggregators (percentile cap, label decoding, strength merging, fusion)
//! - Error types

pub mod aggregators;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    FieldValue, InteractionRecord, InteractionTable, Label, NumericWeights, RawId,
    StrengthWeights,
};

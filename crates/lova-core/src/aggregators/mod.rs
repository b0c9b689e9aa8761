//! Strength aggregators
//!
//! Pure functions that turn raw interaction signals into weighted strengths:
//! - `percentile`: percentile-capped min-max normalization
//! - `label`: bit-encoded label decoding
//! - `merge`: numeric and boolean weighting
//! - `fusion`: blending the two sides into the final strength
//! - `binary_or`, `sequence`: helpers for aggregating raw event logs

pub mod binary_or;
pub mod fusion;
pub mod label;
pub mod merge;
pub mod percentile;
pub mod sequence;

pub use binary_or::calculate_binary_or;
pub use fusion::{fuse_strength, fuse_strengths};
pub use label::{label_list_to_vector, label_to_vector, vector_to_label, BooleanLabelDecoder};
pub use merge::{merge_bool_strength, merge_numerical_strength, weighted_sum};
pub use percentile::{normalize_columns, quantile, PercentileCapNormalizer};
pub use sequence::sequence_order_from_date;

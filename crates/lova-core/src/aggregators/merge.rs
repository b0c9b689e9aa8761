//! Numeric and boolean strength merging

use super::label::BooleanLabelDecoder;
use crate::error::{CoreError, Result};
use crate::types::{InteractionTable, Label, NumericWeights};
use tracing::debug;

/// Dot product of two equally long vectors
pub fn weighted_sum(values: &[f64], weights: &[f64]) -> Result<f64> {
    if values.len() != weights.len() {
        return Err(CoreError::LengthMismatch {
            expected: weights.len(),
            actual: values.len(),
        });
    }
    Ok(values.iter().zip(weights).map(|(v, w)| v * w).sum())
}

/// Per-row numeric strength: `Σ weight_c · value_c` over the weighted columns.
///
/// Columns are read in weight-mapping order. Every weighted column must
/// exist in `table`; this is checked before any row is computed. The table
/// is expected to hold normalized values already.
pub fn merge_numerical_strength(
    table: &InteractionTable,
    weights: &NumericWeights,
) -> Result<Vec<f64>> {
    table.require_columns(weights.columns())?;
    debug!("Merging {} numeric columns with strength values", weights.len());

    let mut strengths = vec![0.0; table.len()];
    for (name, weight) in weights.iter() {
        for (strength, value) in strengths.iter_mut().zip(table.column(name)?) {
            *strength += weight * value;
        }
    }
    Ok(strengths)
}

/// Per-row boolean strength: decoded label bits dotted with `weights`.
///
/// The decode width is `weights.len()`.
pub fn merge_bool_strength(labels: &[Label], weights: &[f64]) -> Result<Vec<f64>> {
    let decoder = BooleanLabelDecoder::new(weights.len())?;
    debug!("Merging boolean labels with {} bit weights", weights.len());

    labels
        .iter()
        .map(|label| decoder.strength(label, weights))
        .collect()
}

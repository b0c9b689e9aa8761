//! Blending numeric and boolean strengths

use crate::error::{CoreError, Result};

/// `numerical · ratio + boolean`.
///
/// The ratio scales the numeric side only; the boolean strength is always
/// added as is.
#[inline]
pub fn fuse_strength(numerical: f64, boolean: f64, ratio: f64) -> f64 {
    numerical * ratio + boolean
}

/// Row-wise [`fuse_strength`]
pub fn fuse_strengths(numerical: &[f64], boolean: &[f64], ratio: f64) -> Result<Vec<f64>> {
    if numerical.len() != boolean.len() {
        return Err(CoreError::LengthMismatch {
            expected: numerical.len(),
            actual: boolean.len(),
        });
    }
    Ok(numerical
        .iter()
        .zip(boolean)
        .map(|(n, b)| fuse_strength(*n, *b, ratio))
        .collect())
}

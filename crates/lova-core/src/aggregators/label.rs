//! Bit-encoded label decoding
//!
//! A label code packs one flag per event type into the bits of an integer.
//! Decoding reads the low `field_num` bits, most significant first, so
//! `label_to_vector(0b10, 2) == [1.0, 0.0]`. Bits at or above `field_num`
//! are ignored: a label with more event types than the configured weight
//! vector simply loses the extra flags.

use crate::error::{CoreError, Result};
use crate::types::Label;

/// Widest label that fits in a `u64` code
pub const MAX_FIELD_NUM: usize = u64::BITS as usize;

fn check_width(field_num: usize) -> Result<()> {
    if field_num > MAX_FIELD_NUM {
        return Err(CoreError::InvalidWidth(field_num));
    }
    Ok(())
}

/// Decode one code into a 0/1 vector of length `field_num`.
pub fn label_to_vector(label: u64, field_num: usize) -> Result<Vec<f64>> {
    check_width(field_num)?;
    Ok((0..field_num)
        .rev()
        .map(|bit| ((label >> bit) & 1) as f64)
        .collect())
}

/// Decode every code and add the vectors element-wise.
///
/// Repeated flags count up instead of saturating at 1; deduplicate the codes
/// first when presence is all that matters.
pub fn label_list_to_vector(labels: &[u64], field_num: usize) -> Result<Vec<f64>> {
    check_width(field_num)?;
    let mut vector = vec![0.0; field_num];
    for &label in labels {
        for (slot, bit) in vector.iter_mut().zip((0..field_num).rev()) {
            *slot += ((label >> bit) & 1) as f64;
        }
    }
    Ok(vector)
}

/// Encode a decoded vector back into a code. Any positive entry sets its bit.
pub fn vector_to_label(vector: &[f64]) -> Result<u64> {
    check_width(vector.len())?;
    Ok(vector
        .iter()
        .rev()
        .enumerate()
        .filter(|(_, value)| **value > 0.0)
        .fold(0u64, |code, (bit, _)| code | (1u64 << bit)))
}

/// Decodes labels at a fixed width and weights the decoded bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanLabelDecoder {
    field_num: usize,
}

impl BooleanLabelDecoder {
    pub fn new(field_num: usize) -> Result<Self> {
        check_width(field_num)?;
        Ok(Self { field_num })
    }

    pub fn field_num(&self) -> usize {
        self.field_num
    }

    /// Summed bit vector of a label
    pub fn decode(&self, label: &Label) -> Vec<f64> {
        let mut vector = vec![0.0; self.field_num];
        for &code in label.codes() {
            for (slot, bit) in vector.iter_mut().zip((0..self.field_num).rev()) {
                *slot += ((code >> bit) & 1) as f64;
            }
        }
        vector
    }

    /// `dot(decode(label), weights)`
    pub fn strength(&self, label: &Label, weights: &[f64]) -> Result<f64> {
        if weights.len() != self.field_num {
            return Err(CoreError::WidthMismatch {
                expected: self.field_num,
                actual: weights.len(),
            });
        }
        super::merge::weighted_sum(&self.decode(label), weights)
    }
}

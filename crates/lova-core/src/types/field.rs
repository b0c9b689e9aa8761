//! Numeric interaction fields and the packed cell encoding

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Separator between elements of a packed multi-valued cell.
pub const PACKED_SEPARATOR: char = '\x02';

/// A numeric field of one interaction: a scalar, or a sequence of
/// per-event values that is merged into a scalar before weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single value
    Scalar(f64),
    /// Sequence of values (e.g. one entry per impression)
    Sequence(Vec<f64>),
}

impl FieldValue {
    /// Reduce to a scalar.
    ///
    /// Sequences are merged with equal importance, i.e. summed. An empty
    /// sequence reduces to `0.0`.
    pub fn reduce(&self) -> f64 {
        match self {
            FieldValue::Scalar(v) => *v,
            FieldValue::Sequence(values) => values.iter().sum(),
        }
    }

    /// Build a field from a packed cell such as `"3\x021\x024"`.
    ///
    /// Every token must be numeric.
    pub fn from_packed(cell: &str) -> Result<Self> {
        let tokens = parse_packed_field(cell);
        let mut values = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                PackedToken::Number(n) => values.push(n as f64),
                PackedToken::Text(text) => {
                    return Err(CoreError::InvalidValue(format!(
                        "non-numeric token '{}' in packed field",
                        text
                    )))
                }
            }
        }
        Ok(match values.as_slice() {
            [single] => FieldValue::Scalar(*single),
            _ => FieldValue::Sequence(values),
        })
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(values: Vec<f64>) -> Self {
        FieldValue::Sequence(values)
    }
}

/// One element of a packed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackedToken {
    /// Digits, with any leading minus signs dropped (absolute value)
    Number(u64),
    /// Anything else, kept verbatim
    Text(String),
}

/// Split a packed cell on [`PACKED_SEPARATOR`].
///
/// Tokens made of digits (optionally prefixed by `-`) become their absolute
/// value; all other tokens are kept as text.
pub fn parse_packed_field(cell: &str) -> Vec<PackedToken> {
    cell.split(PACKED_SEPARATOR)
        .map(|token| {
            let digits = token.trim_start_matches('-');
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = digits.parse::<u64>() {
                    return PackedToken::Number(n);
                }
            }
            PackedToken::Text(token.to_string())
        })
        .collect()
}

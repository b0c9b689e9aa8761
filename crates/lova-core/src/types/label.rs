//! Bit-encoded interaction labels

use super::field::{parse_packed_field, PackedToken};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::slice;

/// Bit-encoded boolean event flags for one interaction.
///
/// Each bit marks one event type (click, like, share, ...). An interaction
/// that aggregates several events carries one encoded integer per event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Single(u64),
    Many(Vec<u64>),
}

impl Label {
    /// The encoded integers of this label.
    pub fn codes(&self) -> &[u64] {
        match self {
            Label::Single(code) => slice::from_ref(code),
            Label::Many(codes) => codes,
        }
    }

    /// Parse a packed cell such as `"3\x021"`.
    pub fn from_packed(cell: &str) -> Result<Self> {
        let mut codes = Vec::new();
        for token in parse_packed_field(cell) {
            match token {
                PackedToken::Number(n) => codes.push(n),
                PackedToken::Text(text) => {
                    return Err(CoreError::InvalidValue(format!(
                        "non-numeric label token '{}'",
                        text
                    )))
                }
            }
        }
        Ok(match codes.as_slice() {
            [single] => Label::Single(*single),
            _ => Label::Many(codes),
        })
    }
}

impl From<u64> for Label {
    fn from(code: u64) -> Self {
        Label::Single(code)
    }
}

impl From<Vec<u64>> for Label {
    fn from(codes: Vec<u64>) -> Self {
        Label::Many(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Label::Single(5).codes(), &[5]);
        assert_eq!(Label::Many(vec![1, 2]).codes(), &[1, 2]);
        assert!(Label::Many(vec![]).codes().is_empty());
    }

    #[test]
    fn test_from_packed() {
        assert_eq!(Label::from_packed("6").unwrap(), Label::Single(6));
        assert_eq!(Label::from_packed("1\x024").unwrap(), Label::Many(vec![1, 4]));
        assert!(Label::from_packed("click").is_err());
    }

    #[test]
    fn test_serde_untagged() {
        let labels: Vec<Label> = serde_json::from_str("[3, [1, 2]]").unwrap();
        assert_eq!(labels, vec![Label::Single(3), Label::Many(vec![1, 2])]);
    }
}

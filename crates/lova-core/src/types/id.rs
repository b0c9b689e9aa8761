//! Opaque user/item identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw identifier as it appears in the dataset.
///
/// Ids are opaque: the only operations the pipeline needs are hashing and
/// equality. Integer and text ids never compare equal to each other, so
/// `RawId::Int(7)` and `RawId::Text("7")` index to different rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// Integer id
    Int(i64),
    /// String id
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(v) => write!(f, "{}", v),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        RawId::Int(value)
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        RawId::Text(value.to_string())
    }
}

impl From<String> for RawId {
    fn from(value: String) -> Self {
        RawId::Text(value)
    }
}

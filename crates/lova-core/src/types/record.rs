//! Raw interaction records

use super::{FieldValue, Label, RawId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One user-item interaction as read from the dataset.
///
/// Fields other than `user`, `item` and `label` are numeric signals
/// (counters, durations, ...), flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user: RawId,
    pub item: RawId,
    pub label: Label,
    #[serde(flatten, default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl InteractionRecord {
    /// Create a record without numeric fields
    pub fn new(user: impl Into<RawId>, item: impl Into<RawId>, label: impl Into<Label>) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            label: label.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a numeric field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a numeric field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

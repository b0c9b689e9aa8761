//! Strength weights for numeric columns and boolean event bits

use crate::error::{CoreError, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered mapping from numeric column name to weight.
///
/// Iteration order is insertion order. The same order is used for the
/// selected columns and for the weight list when computing the numeric
/// strength, so the two never drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericWeights(Vec<(String, f64)>);

impl NumericWeights {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a weight. A replaced column keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, weight: f64) {
        let column = column.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = weight,
            None => self.0.push((column, weight)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, weight: f64) -> Self {
        self.insert(column, weight);
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    /// Column names in mapping order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Weights in mapping order
    pub fn weights(&self) -> Vec<f64> {
        self.0.iter().map(|(_, weight)| *weight).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for NumericWeights {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut weights = NumericWeights::new();
        for (column, weight) in iter {
            weights.insert(column, weight);
        }
        weights
    }
}

impl Serialize for NumericWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, weight) in &self.0 {
            map.serialize_entry(column, weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NumericWeights {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = NumericWeights;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to weight")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut weights = NumericWeights::new();
                while let Some((column, weight)) = access.next_entry::<String, f64>()? {
                    weights.insert(column, weight);
                }
                Ok(weights)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// One full fusion configuration: the unit the tuner searches over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthWeights {
    /// Numeric column weights
    pub numeric: NumericWeights,
    /// Weights over decoded label bits, most significant bit first
    pub boolean: Vec<f64>,
    /// Blend ratio applied to the numeric side only
    pub ratio: f64,
}

impl StrengthWeights {
    pub fn new(numeric: NumericWeights, boolean: Vec<f64>, ratio: f64) -> Self {
        Self {
            numeric,
            boolean,
            ratio,
        }
    }

    /// Decode width implied by the boolean weight vector
    pub fn field_num(&self) -> usize {
        self.boolean.len()
    }

    /// Reject non-finite weights
    pub fn validate(&self) -> Result<()> {
        for (column, weight) in self.numeric.iter() {
            if !weight.is_finite() {
                return Err(CoreError::InvalidValue(format!(
                    "weight for column '{}' is {}",
                    column, weight
                )));
            }
        }
        if let Some(weight) = self.boolean.iter().find(|w| !w.is_finite()) {
            return Err(CoreError::InvalidValue(format!(
                "boolean weight is {}",
                weight
            )));
        }
        if !self.ratio.is_finite() {
            return Err(CoreError::InvalidValue(format!(
                "blend ratio is {}",
                self.ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let mut weights = NumericWeights::new();
        weights.insert("b", 1.0);
        weights.insert("a", 2.0);
        weights.insert("b", 3.0);

        assert_eq!(weights.columns().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(weights.weights(), vec![3.0, 2.0]);
        assert_eq!(weights.get("a"), Some(2.0));
        assert_eq!(weights.get("c"), None);
    }

    #[test]
    fn test_serde_preserves_order() {
        let weights: NumericWeights =
            serde_json::from_str(r#"{"zeta": 0.5, "alpha": 1.5}"#).unwrap();
        assert_eq!(weights.columns().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        let json = serde_json::to_string(&weights).unwrap();
        assert_eq!(json, r#"{"zeta":0.5,"alpha":1.5}"#);
    }

    #[test]
    fn test_strength_weights_validate() {
        let weights = StrengthWeights::new(
            NumericWeights::new().with("a", 1.0),
            vec![1.0, 2.0],
            0.5,
        );
        assert!(weights.validate().is_ok());
        assert_eq!(weights.field_num(), 2);

        let bad = StrengthWeights::new(NumericWeights::new(), vec![f64::NAN], 0.5);
        assert!(matches!(bad.validate(), Err(CoreError::InvalidValue(_))));
    }
}

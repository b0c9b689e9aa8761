//! Columnar snapshot of an interaction dataset

use super::{InteractionRecord, Label, RawId};
use crate::error::{CoreError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Column-oriented view of a dataset snapshot.
///
/// Numeric cells are reduced to scalars on construction, so sequence fields
/// are merged exactly once. Row `i` of every column belongs to the same
/// interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionTable {
    users: Vec<RawId>,
    items: Vec<RawId>,
    labels: Vec<Label>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl InteractionTable {
    /// Build a table holding the named numeric columns.
    ///
    /// Only the named columns are collected; other fields may be present on
    /// some records and absent on others. A name carried by no record is
    /// [`CoreError::UnknownColumn`], a name missing from some records is
    /// [`CoreError::FieldNotFound`] for the first such row.
    pub fn from_records<'a>(
        records: &[InteractionRecord],
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let names: BTreeSet<&str> = columns.into_iter().collect();
        if let Some(unknown) = names
            .iter()
            .find(|name| !records.iter().any(|record| record.field(name).is_some()))
        {
            return Err(CoreError::UnknownColumn(unknown.to_string()));
        }

        let mut columns: BTreeMap<String, Vec<f64>> = names
            .iter()
            .map(|name| (name.to_string(), Vec::with_capacity(records.len())))
            .collect();
        let mut users = Vec::with_capacity(records.len());
        let mut items = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            for (name, column) in columns.iter_mut() {
                let value = record.field(name).ok_or_else(|| CoreError::FieldNotFound {
                    field: name.clone(),
                    row,
                })?;
                column.push(value.reduce());
            }
            users.push(record.user.clone());
            items.push(record.item.clone());
            labels.push(record.label.clone());
        }

        Ok(Self {
            users,
            items,
            labels,
            columns,
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &[RawId] {
        &self.users
    }

    pub fn items(&self) -> &[RawId] {
        &self.items
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))
    }

    /// Fail on the first name that is not a column of this table
    pub fn require_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            if !self.has_column(name) {
                return Err(CoreError::UnknownColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Replace the values of an existing column
    pub fn replace_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        let expected = self.len();
        let column = self
            .columns
            .get_mut(name)
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))?;
        if values.len() != expected {
            return Err(CoreError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        *column = values;
        Ok(())
    }
}

//! Interaction preprocessing
//!
//! Everything that does not depend on the weights is computed once per
//! dataset snapshot: numeric columns are percentile-capped and normalized,
//! labels are decoded, ids are indexed and the matrix layout is fixed. A
//! new set of weights then only re-derives the value stream.

use crate::error::{Result, RuntimeError};
use crate::index::{IdIndexer, IndexMaps};
use crate::matrix::{CsrMatrix, SparseMatrixBuilder};
use lova_core::aggregators::percentile::DEFAULT_PERCENTILE;
use lova_core::aggregators::{
    fuse_strengths, merge_numerical_strength, normalize_columns, weighted_sum,
    BooleanLabelDecoder,
};
use lova_core::{CoreError, InteractionRecord, InteractionTable, StrengthWeights};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Weight-independent preprocessing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Cap quantile in (0, 1]
    #[serde(default = "default_percentile")]
    pub percentile: f64,

    /// Numeric columns to normalize (the keys of the numeric weights)
    pub numeric_columns: Vec<String>,

    /// Label decode width (the length of the boolean weights)
    pub field_num: usize,
}

fn default_percentile() -> f64 {
    DEFAULT_PERCENTILE
}

impl PreprocessConfig {
    pub fn new(numeric_columns: Vec<String>, field_num: usize) -> Self {
        Self {
            percentile: default_percentile(),
            numeric_columns,
            field_num,
        }
    }

    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.percentile = percentile;
        self
    }

    /// Derive the options from a weight configuration
    pub fn for_weights(weights: &StrengthWeights, percentile: f64) -> Self {
        Self {
            percentile,
            numeric_columns: weights.numeric.columns().map(str::to_string).collect(),
            field_num: weights.field_num(),
        }
    }
}

/// Prepared dataset snapshot
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    table: InteractionTable,
    decoded: Vec<Vec<f64>>,
    maps: IndexMaps,
    layout: SparseMatrixBuilder,
}

impl Preprocessor {
    pub fn new(records: &[InteractionRecord], config: PreprocessConfig) -> Result<Self> {
        if records.is_empty() {
            return Err(RuntimeError::EmptyDataset);
        }
        let started = Instant::now();

        let columns = || config.numeric_columns.iter().map(String::as_str);
        let mut table = InteractionTable::from_records(records, columns())?;
        normalize_columns(&mut table, columns(), config.percentile)?;

        let decoder = BooleanLabelDecoder::new(config.field_num)?;
        let decoded: Vec<Vec<f64>> = table.labels().iter().map(|l| decoder.decode(l)).collect();

        let maps = IdIndexer::index(&table);
        let mut rows = Vec::with_capacity(table.len());
        let mut cols = Vec::with_capacity(table.len());
        for (user, item) in table.users().iter().zip(table.items()) {
            let (row, col) = maps.lookup(user, item).ok_or_else(|| {
                RuntimeError::ShapeMismatch(format!("id pair ({}, {}) missing from index", user, item))
            })?;
            rows.push(row);
            cols.push(col);
        }
        let layout = SparseMatrixBuilder::new(maps.users.len(), maps.items.len(), &rows, &cols)?;

        info!(
            "Preprocessed {} interactions: {} users, {} items, {} numeric columns, {} label bits in {}ms",
            table.len(),
            maps.users.len(),
            maps.items.len(),
            config.numeric_columns.len(),
            config.field_num,
            started.elapsed().as_millis()
        );

        Ok(Self {
            config,
            table,
            decoded,
            maps,
            layout,
        })
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Normalized table
    pub fn table(&self) -> &InteractionTable {
        &self.table
    }

    /// Index maps fixed at construction
    pub fn maps(&self) -> &IndexMaps {
        &self.maps
    }

    /// Matrix shape (users, items)
    pub fn shape(&self) -> (usize, usize) {
        self.layout.shape()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Fused strength of every interaction under `weights`
    pub fn strengths(&self, weights: &StrengthWeights) -> Result<Vec<f64>> {
        weights.validate()?;
        for column in weights.numeric.columns() {
            if !self.config.numeric_columns.iter().any(|c| c == column) {
                return Err(CoreError::UnknownColumn(column.to_string()).into());
            }
        }
        if weights.boolean.len() != self.config.field_num {
            return Err(CoreError::WidthMismatch {
                expected: self.config.field_num,
                actual: weights.boolean.len(),
            }
            .into());
        }

        let numerical = merge_numerical_strength(&self.table, &weights.numeric)?;
        let boolean = self
            .decoded
            .iter()
            .map(|bits| weighted_sum(bits, &weights.boolean))
            .collect::<lova_core::Result<Vec<f64>>>()?;

        Ok(fuse_strengths(&numerical, &boolean, weights.ratio)?)
    }

    /// Fresh matrix snapshot under `weights`; shape and layout never change
    pub fn build_matrix(&self, weights: &StrengthWeights) -> Result<CsrMatrix> {
        let strengths = self.strengths(weights)?;
        let matrix = self.layout.build(&strengths)?;
        debug!(
            "Rebuilt interaction matrix {:?} with {} entries",
            matrix.shape(),
            matrix.nnz()
        );
        Ok(matrix)
    }
}

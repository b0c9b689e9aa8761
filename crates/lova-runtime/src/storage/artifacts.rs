//! JSON artifacts of a preprocessing/tuning run

use crate::error::{Result, RuntimeError};
use crate::factorization::FactorMatrices;
use crate::index::{IndexMap, IndexMaps};
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const USER_INDEX_FILE: &str = "user_index.json";
pub const ITEM_INDEX_FILE: &str = "item_index.json";
pub const USER_FACTORS_FILE: &str = "user_factors.json";
pub const ITEM_FACTORS_FILE: &str = "item_factors.json";

/// Directory holding the artifacts of one run.
///
/// Index maps are stored as id lists in index order; factor matrices as
/// row-major nested arrays.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store, creating the directory if needed
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Write any serializable value as pretty JSON
    pub fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<PathBuf> {
        let path = self.path(file);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        Ok(path)
    }

    pub fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let reader = BufReader::new(File::open(self.path(file))?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save_index_maps(&self, maps: &IndexMaps) -> Result<()> {
        self.write_json(USER_INDEX_FILE, &maps.users)?;
        self.write_json(ITEM_INDEX_FILE, &maps.items)?;
        info!(
            "Saved index maps ({} users, {} items) to {}",
            maps.users.len(),
            maps.items.len(),
            self.root.display()
        );
        Ok(())
    }

    pub fn load_index_maps(&self) -> Result<IndexMaps> {
        let users: IndexMap = self.read_json(USER_INDEX_FILE)?;
        let items: IndexMap = self.read_json(ITEM_INDEX_FILE)?;
        Ok(IndexMaps { users, items })
    }

    pub fn save_factors(&self, factors: &FactorMatrices) -> Result<()> {
        self.write_json(USER_FACTORS_FILE, &to_rows(&factors.user_factors))?;
        self.write_json(ITEM_FACTORS_FILE, &to_rows(&factors.item_factors))?;
        info!(
            "Saved factor matrices ({}x{}, {}x{}) to {}",
            factors.n_users(),
            factors.factors(),
            factors.n_items(),
            factors.factors(),
            self.root.display()
        );
        Ok(())
    }

    pub fn load_factors(&self) -> Result<FactorMatrices> {
        let users = from_rows(self.read_json(USER_FACTORS_FILE)?)?;
        let items = from_rows(self.read_json(ITEM_FACTORS_FILE)?)?;
        FactorMatrices::new(users, items)
    }
}

fn to_rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn from_rows(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != n_cols) {
        return Err(RuntimeError::ShapeMismatch(format!(
            "ragged factor matrix: expected {} columns, found a row with {}",
            n_cols,
            bad.len()
        )));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| RuntimeError::ShapeMismatch(e.to_string()))
}

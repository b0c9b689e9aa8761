//! Percentile-capped min-max normalization

use crate::error::{CoreError, Result};
use crate::types::InteractionTable;
use tracing::debug;

/// Default cap quantile
pub const DEFAULT_PERCENTILE: f64 = 0.999;

/// Caps a column at its `percentile` quantile, then rescales it to [0, 1].
///
/// Only the upper tail is capped. The rescale uses the minimum and maximum
/// of the capped column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileCapNormalizer {
    percentile: f64,
}

impl PercentileCapNormalizer {
    pub fn new(percentile: f64) -> Result<Self> {
        if !(percentile > 0.0 && percentile <= 1.0) {
            return Err(CoreError::InvalidPercentile(percentile));
        }
        Ok(Self { percentile })
    }

    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Normalize one column. `name` is only used in error messages.
    pub fn normalize(&self, name: &str, values: &[f64]) -> Result<Vec<f64>> {
        if values.is_empty() {
            return Err(CoreError::EmptyColumn(name.to_string()));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(CoreError::InvalidValue(format!(
                "column '{}' contains {}",
                name, bad
            )));
        }

        let cap = quantile(values, self.percentile)?;
        let capped: Vec<f64> = values.iter().map(|v| v.min(cap)).collect();

        let min = capped.iter().copied().fold(f64::INFINITY, f64::min);
        let max = capped.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range <= 0.0 {
            return Err(CoreError::DegenerateColumn {
                column: name.to_string(),
                value: min,
            });
        }

        debug!(
            "Column '{}' capped at {} (p={}), range [{}, {}]",
            name, cap, self.percentile, min, max
        );

        if range.is_finite() {
            return Ok(capped.into_iter().map(|v| (v - min) / range).collect());
        }

        // `max - min` overflows for columns spanning most of the f64 range
        let scale = min.abs().max(max.abs());
        let (low, high) = (min / scale, max / scale);
        Ok(capped
            .into_iter()
            .map(|v| (v / scale - low) / (high - low))
            .collect())
    }
}

impl Default for PercentileCapNormalizer {
    fn default() -> Self {
        Self {
            percentile: DEFAULT_PERCENTILE,
        }
    }
}

/// The `p`-quantile of `values` with linear interpolation between the two
/// closest ranks (rank position `p * (n - 1)`).
pub fn quantile(values: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(CoreError::InvalidPercentile(p));
    }
    if values.is_empty() {
        return Err(CoreError::EmptyColumn(String::new()));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    let (a, b) = (sorted[lower], sorted[upper]);
    let gap = b - a;
    if gap.is_finite() {
        Ok(a + gap * fraction)
    } else {
        Ok(a * (1.0 - fraction) + b * fraction)
    }
}

/// Normalize the selected columns of `table` in place.
///
/// All names are checked before any column is touched.
pub fn normalize_columns<'a>(
    table: &mut InteractionTable,
    columns: impl IntoIterator<Item = &'a str> + Clone,
    percentile: f64,
) -> Result<()> {
    let normalizer = PercentileCapNormalizer::new(percentile)?;
    table.require_columns(columns.clone())?;

    debug!("Normalizing with percentile cap {}", percentile);
    for name in columns {
        let normalized = normalizer.normalize(name, table.column(name)?)?;
        table.replace_column(name, normalized)?;
    }
    Ok(())
}

//! Interaction file readers

use crate::config::{ColumnConfig, InputFormat};
use anyhow::{bail, Context, Result};
use csv::StringRecord;
use lova_core::{FieldValue, InteractionRecord, Label, RawId};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Read every interaction of a file
pub fn read_records(
    path: &Path,
    format: InputFormat,
    columns: &ColumnConfig,
) -> Result<Vec<InteractionRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let records = match format {
        InputFormat::Jsonl => read_jsonl(reader, columns),
        InputFormat::Tsv => read_tsv(reader, columns),
    }
    .with_context(|| format!("Failed to read {}", path.display()))?;

    debug!("Read {} interactions from {}", records.len(), path.display());
    Ok(records)
}

/// JSON-lines: one object per line, extra numeric keys become fields
pub fn read_jsonl<R: BufRead>(reader: R, columns: &ColumnConfig) -> Result<Vec<InteractionRecord>> {
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("line {}: invalid JSON", number + 1))?;
        let Value::Object(mut object) = value else {
            bail!("line {}: expected a JSON object", number + 1);
        };

        for name in &columns.drop {
            object.remove(name);
        }
        let mut renamed = serde_json::Map::new();
        for (target, source) in [
            ("user", &columns.user),
            ("item", &columns.item),
            ("label", &columns.label),
        ] {
            let value = object
                .remove(source.as_str())
                .with_context(|| format!("line {}: missing column '{}'", number + 1, source))?;
            renamed.insert(target.to_string(), value);
        }
        renamed.extend(object);

        let record: InteractionRecord = serde_json::from_value(Value::Object(renamed))
            .with_context(|| format!("line {}: invalid interaction", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Header-less TSV with declared column names
pub fn read_tsv<R: Read>(reader: R, columns: &ColumnConfig) -> Result<Vec<InteractionRecord>> {
    if columns.names.is_empty() {
        bail!("TSV input requires columns.names");
    }
    for required in [&columns.user, &columns.item, &columns.label] {
        if !columns.names.contains(required) {
            bail!("column '{}' is not among columns.names", required);
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.records() {
        let row: StringRecord = result?;
        let line = row.position().map_or(0, |p| p.line());
        if row.len() != columns.names.len() {
            bail!(
                "line {}: expected {} cells, got {}",
                line,
                columns.names.len(),
                row.len()
            );
        }

        let mut user = None;
        let mut item = None;
        let mut label = None;
        let mut fields = Vec::new();
        for (name, cell) in columns.names.iter().zip(row.iter()) {
            if columns.drop.contains(name) {
                continue;
            }
            if *name == columns.user {
                user = Some(parse_id(cell));
            } else if *name == columns.item {
                item = Some(parse_id(cell));
            } else if *name == columns.label {
                label = Some(
                    Label::from_packed(cell)
                        .with_context(|| format!("line {}: column '{}'", line, name))?,
                );
            } else {
                let value = parse_field(cell)
                    .with_context(|| format!("line {}: column '{}'", line, name))?;
                fields.push((name.clone(), value));
            }
        }

        let (Some(user), Some(item), Some(label)) = (user, item, label) else {
            bail!("line {}: id or label column was dropped", line);
        };
        let record = fields
            .into_iter()
            .fold(InteractionRecord::new(user, item, label), |record, (name, value)| {
                record.with_field(name, value)
            });
        records.push(record);
    }
    Ok(records)
}

fn parse_id(cell: &str) -> RawId {
    match cell.parse::<i64>() {
        Ok(id) => RawId::Int(id),
        Err(_) => RawId::Text(cell.to_string()),
    }
}

fn parse_field(cell: &str) -> lova_core::Result<FieldValue> {
    match cell.parse::<f64>() {
        Ok(value) => Ok(FieldValue::Scalar(value)),
        Err(_) => FieldValue::from_packed(cell),
    }
}

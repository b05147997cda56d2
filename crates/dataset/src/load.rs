use std::collections::HashMap;
use std::path::{Path, PathBuf};

use prospector_core::config::DatasetConfig;
use thiserror::Error;
use tracing::info;

use crate::table::Dataset;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read dataset `{path}`: {source}")]
    Read { path: PathBuf, source: csv::Error },
    #[error("merge key column `{0}` is missing from a source table")]
    MissingMergeKey(String),
    #[error("filter column `{0}` is missing from the merged table")]
    MissingFilterColumn(String),
    #[error("could not write dataset cache `{path}`: {source}")]
    WriteCache { path: PathBuf, source: csv::Error },
}

/// Builds the lead table the tabular agent searches: load both source CSVs,
/// outer-merge them on the configured key column, then keep only rows that
/// match the business predicate (configured origin value, non-empty
/// required column).
pub fn load_filtered(config: &DatasetConfig) -> Result<Dataset, DatasetError> {
    let leads = read_table(&config.leads_path)?;
    let details = read_table(&config.details_path)?;

    let merged = merge_outer(&leads, &details, &config.merge_key)?;
    let filtered = apply_business_filter(
        &merged,
        &config.origin_column,
        &config.origin_value,
        &config.required_column,
    )?;

    info!(
        event_name = "dataset.load.filtered",
        source_rows = merged.len(),
        filtered_rows = filtered.len(),
        "lead dataset merged and filtered"
    );

    Ok(filtered)
}

pub fn write_cache(dataset: &Dataset, path: &Path) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|source| DatasetError::WriteCache { path: path.to_path_buf(), source })?;

    let fail = |source| DatasetError::WriteCache { path: path.to_path_buf(), source };
    writer.write_record(dataset.columns()).map_err(fail)?;
    for row in dataset.rows() {
        writer.write_record(row).map_err(fail)?;
    }
    writer.flush().map_err(|source| DatasetError::WriteCache {
        path: path.to_path_buf(),
        source: csv::Error::from(source),
    })?;

    info!(event_name = "dataset.cache.written", path = %path.display(), "filtered dataset cached");
    Ok(())
}

fn read_table(path: &Path) -> Result<Dataset, DatasetError> {
    let fail = |source| DatasetError::Read { path: path.to_path_buf(), source };

    let mut reader =
        csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(fail)?;

    let columns =
        reader.headers().map_err(fail)?.iter().map(str::to_string).collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(fail)?;
        let mut row = record.iter().map(str::to_string).collect::<Vec<_>>();
        // Short rows are padded so every row lines up with the header.
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    Ok(Dataset::new(columns, rows))
}

/// Outer merge on `key`: left rows joined with the first matching right
/// row, then right-only rows appended. Right-hand columns that duplicate a
/// left-hand name are dropped, so the key appears once.
fn merge_outer(left: &Dataset, right: &Dataset, key: &str) -> Result<Dataset, DatasetError> {
    let left_key = column_position(left, key).ok_or_else(|| missing_key(key))?;
    let right_key = column_position(right, key).ok_or_else(|| missing_key(key))?;

    let right_extra: Vec<usize> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| !left.columns().contains(name))
        .map(|(index, _)| index)
        .collect();

    let mut columns = left.columns().to_vec();
    columns.extend(right_extra.iter().map(|&index| right.columns()[index].clone()));

    let mut right_by_key: HashMap<&str, &Vec<String>> = HashMap::new();
    for row in right.rows() {
        right_by_key.entry(row[right_key].as_str()).or_insert(row);
    }

    let mut rows = Vec::with_capacity(left.len());
    for row in left.rows() {
        let mut merged = row.clone();
        match right_by_key.get(row[left_key].as_str()) {
            Some(matched) => {
                merged.extend(right_extra.iter().map(|&index| matched[index].clone()));
            }
            None => merged.extend(std::iter::repeat(String::new()).take(right_extra.len())),
        }
        rows.push(merged);
    }

    let left_keys: std::collections::HashSet<&str> =
        left.rows().iter().map(|row| row[left_key].as_str()).collect();
    for row in right.rows() {
        if left_keys.contains(row[right_key].as_str()) {
            continue;
        }
        let mut merged = vec![String::new(); left.columns().len()];
        merged[left_key] = row[right_key].clone();
        merged.extend(right_extra.iter().map(|&index| row[index].clone()));
        rows.push(merged);
    }

    Ok(Dataset::new(columns, rows))
}

fn apply_business_filter(
    merged: &Dataset,
    origin_column: &str,
    origin_value: &str,
    required_column: &str,
) -> Result<Dataset, DatasetError> {
    let origin = column_position(merged, origin_column)
        .ok_or_else(|| DatasetError::MissingFilterColumn(origin_column.to_string()))?;
    let required = column_position(merged, required_column)
        .ok_or_else(|| DatasetError::MissingFilterColumn(required_column.to_string()))?;

    let rows = merged
        .rows()
        .iter()
        .filter(|row| row[origin] == origin_value && !row[required].trim().is_empty())
        .cloned()
        .collect();

    Ok(Dataset::new(merged.columns().to_vec(), rows))
}

fn column_position(dataset: &Dataset, column: &str) -> Option<usize> {
    dataset.columns().iter().position(|name| name == column)
}

fn missing_key(key: &str) -> DatasetError {
    DatasetError::MissingMergeKey(key.to_string())
}

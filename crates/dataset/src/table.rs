use serde_json::{Map, Value};

/// The pre-merged, pre-filtered lead table. Built once at process start and
/// never mutated afterwards, so it is shared behind an `Arc` and read
/// concurrently without locking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_exists(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    /// Rows whose `column` value contains `condition`, case-insensitively.
    /// An empty condition matches every row (substring-of-empty is always
    /// true); callers rely on that to mean "no filter".
    ///
    /// Returns `None` when the column does not exist; the caller owns the
    /// "Invalid column name." contract.
    pub fn filter(&self, column: &str, condition: &str) -> Option<Vec<Map<String, Value>>> {
        let index = self.column_index(column)?;
        let needle = condition.to_lowercase();

        let records = self
            .rows
            .iter()
            .filter(|row| {
                row.get(index).map(|value| value.to_lowercase().contains(&needle)).unwrap_or(false)
            })
            .map(|row| self.row_to_record(row))
            .collect();

        Some(records)
    }

    /// Every row serialized as a JSON record, column order preserved in row
    /// order (JSON object key order follows the serializer).
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows.iter().map(|row| self.row_to_record(row)).collect()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn row_to_record(&self, row: &[String]) -> Map<String, Value> {
        self.columns
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.clone(), Value::String(value.clone())))
            .collect()
    }
}

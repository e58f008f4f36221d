//! Result types for query execution

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::dataset::{DatasetKind, Value};

/// One output row; values align with [`QueryOutput::columns`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub values: Vec<Value>,
}

impl ResultRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: usize) -> Option<&Value> {
        self.values.get(column)
    }
}

/// Rows produced by a query, in final order
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub dataset_id: String,
    pub kind: DatasetKind,
    /// Output keys in COLUMNS order
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl QueryOutput {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// All values of one column, in row order
    pub fn column_values(&self, column: &str) -> Vec<&Value> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// JSON array of objects keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let obj = self
                    .columns
                    .iter()
                    .zip(&row.values)
                    .map(|(col, v)| (col.clone(), v.to_json()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

struct RowView<'a> {
    columns: &'a [String],
    row: &'a ResultRow,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (col, value) in self.columns.iter().zip(&self.row.values) {
            map.serialize_entry(col, &value.to_json())?;
        }
        map.end()
    }
}

/// Serializes as the JSON row array, keeping column order
impl Serialize for QueryOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&RowView {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

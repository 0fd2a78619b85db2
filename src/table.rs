//! The canonical table shape: ordered headers plus uniform string rows.
//!
//! Every extraction response, whatever its wire shape, is normalized into an
//! [`ExtractedTable`] before anything downstream sees it. The invariant is
//! that every row has exactly `headers.len()` cells; short rows are padded
//! with empty strings, long rows truncated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// Pair headers with rows, padding or truncating each row to the header
    /// width. An empty header list yields an empty table, not an error.
    pub fn from_headers_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        if headers.is_empty() {
            return Self::default();
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Build a table from an array of JSON row objects. Headers are the
    /// union of keys in first-seen order; missing keys become empty cells.
    /// Returns the reason when any element is not an object.
    pub fn from_records(records: &[Value]) -> Result<Self, String> {
        let mut headers: Vec<String> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let Some(object) = record.as_object() else {
                return Err(format!(
                    "row {index} is {}, expected an object",
                    type_name(record)
                ));
            };
            for key in object.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                let object = record.as_object();
                headers
                    .iter()
                    .map(|header| {
                        object
                            .and_then(|o| o.get(header))
                            .map(cell_text)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// View the rows as JSON objects keyed by header, in header order.
    pub fn records(&self) -> Vec<serde_json::Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|cell| Value::String(cell.clone())))
                    .collect()
            })
            .collect()
    }

    /// Overwrite one cell. Returns false when the coordinates are out of
    /// bounds.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_row(&mut self, row: usize) -> bool {
        if row < self.rows.len() {
            self.rows.remove(row);
            true
        } else {
            false
        }
    }

    /// Append a blank row matching the header width. No-op on an empty
    /// table, which has no columns to fill.
    pub fn push_empty_row(&mut self) {
        if !self.headers.is_empty() {
            self.rows.push(vec![String::new(); self.headers.len()]);
        }
    }

    /// Move a row to a new position, shifting the rows between.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rows.len() || to >= self.rows.len() {
            return false;
        }
        let row = self.rows.remove(from);
        self.rows.insert(to, row);
        true
    }
}

/// Render one JSON value as cell text. Strings pass through unquoted;
/// anything else keeps its JSON rendering.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

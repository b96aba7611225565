//! In-memory tabular data shared by every reader and writer

use serde::{Deserialize, Serialize};

/// A header row plus text cells, as read from a CSV file, a workbook tab or a
/// Google Sheets tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from raw values where the first row is the header.
    /// Rows where every cell is blank are dropped.
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut iter = values.into_iter();
        let headers = match iter.next() {
            Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
            None => return Self::default(),
        };

        let rows = iter
            .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
            .collect();

        Self { headers, rows }
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell text; rows shorter than the header read as empty cells
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Header followed by every row, padded to the header width
    pub fn to_values(&self) -> Vec<Vec<String>> {
        let width = self.headers.len();
        let mut values = Vec::with_capacity(self.rows.len() + 1);
        values.push(self.headers.clone());
        for row in &self.rows {
            let mut padded = row.clone();
            if padded.len() < width {
                padded.resize(width, String::new());
            }
            values.push(padded);
        }
        values
    }
}

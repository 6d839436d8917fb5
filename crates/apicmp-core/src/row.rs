//! A recorded request read from the row source

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One recorded request with a stable index
///
/// The index is unique within a run but not necessarily contiguous: filtered
/// rows keep the position they had in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub data: HashMap<String, String>,
}

impl Row {
    pub fn new(index: usize, data: HashMap<String, String>) -> Self {
        Self { index, data }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<K, V>(index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            index,
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a column value, treating empty cells as absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.data
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The request path of this row
    pub fn path(&self) -> Option<&str> {
        self.get(crate::PATH_COLUMN)
    }
}

//! CSV row source
//!
//! Each data record of a headed CSV file becomes a [`Row`] whose index is the
//! record's 0-based position in the file. Records are then filtered:
//! - rows without a `path` are dropped
//! - rows with an unsupported `method` are dropped (an empty method means GET)
//! - when specific indices are requested, every other row is dropped
//!
//! Filtered rows keep their original index, so indices reported after a run
//! can be fed back with `--rows` to replay just those rows.

use crate::error::{ConfigError, ConfigResult};
use apicmp_core::{Method, Row, METHOD_COLUMN};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

type RowFilter<'a> = Box<dyn Fn(&Row) -> bool + 'a>;

fn has_path(row: &Row) -> bool {
    row.path().is_some()
}

fn has_valid_method(row: &Row) -> bool {
    row.get(METHOD_COLUMN)
        .map_or(true, |method| method.parse::<Method>().is_ok())
}

fn filters(only_rows: &[usize]) -> Vec<RowFilter<'_>> {
    let mut filters: Vec<RowFilter<'_>> = Vec::new();
    filters.push(Box::new(has_path));
    filters.push(Box::new(has_valid_method));
    if !only_rows.is_empty() {
        filters.push(Box::new(move |row: &Row| only_rows.contains(&row.index)));
    }
    filters
}

/// Read and filter the rows of a CSV file
pub fn read_rows(path: impl AsRef<Path>, only_rows: &[usize]) -> ConfigResult<Vec<Row>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rows = parse_rows(file, only_rows).map_err(|e| ConfigError::ParseCsv {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(path = %path.display(), rows = rows.len(), "Loaded rows");
    Ok(rows)
}

/// Parse and filter rows from any CSV reader
pub fn parse_rows(reader: impl std::io::Read, only_rows: &[usize]) -> Result<Vec<Row>, csv::Error> {
    let filters = filters(only_rows);
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row = Row::new(index, record?);
        if filters.iter().all(|keep| keep(&row)) {
            rows.push(row);
        } else {
            debug!(row = index, "Skipping filtered row");
        }
    }
    Ok(rows)
}

//! Comparison statistics
//!
//! [`Stats`] is the [`StatsSink`] used by the `apicmp` binary. It counts rows
//! once no matter how many divergences they produce, and groups failures by
//! path with array indices normalized (`items[3].id` becomes `items[n].id`),
//! so a systematic difference shows up as one line listing every affected
//! row.

use apicmp_core::{Row, StatsSink};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};

static INDEX_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Replace every array index in a path with `[n]`
pub fn normalize_path(path: &str) -> String {
    INDEX_PATTERN
        .get_or_init(|| Regex::new(r"\[[0-9]+\]").expect("index pattern is valid"))
        .replace_all(path, "[n]")
        .into_owned()
}

/// Running totals of a comparison run
#[derive(Debug, Default)]
pub struct Stats {
    processed: HashSet<usize>,
    success_count: usize,
    failed_rows: Vec<usize>,
    failures_by_path: IndexMap<String, Vec<usize>>,
}

/// Snapshot of [`Stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_processed: usize,
    pub success: usize,
    pub failures: usize,
    pub failed_rows: Vec<usize>,
    pub failures_by_path: IndexMap<String, Vec<usize>>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_processed(&self) -> usize {
        self.processed.len()
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failed_rows.len()
    }

    /// Rows that produced at least one divergence, in the order they failed
    pub fn failed_rows(&self) -> &[usize] {
        &self.failed_rows
    }

    /// Rows that failed at `path` (given in normalized form)
    pub fn rows_failed_at(&self, path: &str) -> Option<&[usize]> {
        self.failures_by_path.get(path).map(Vec::as_slice)
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total_processed: self.total_processed(),
            success: self.success_count,
            failures: self.failure_count(),
            failed_rows: self.failed_rows.clone(),
            failures_by_path: self.failures_by_path.clone(),
        }
    }

    /// Log the summary block
    pub fn print_stats(&self) {
        info!("{}", self.summary());
    }
}

impl StatsSink for Stats {
    fn failure(&mut self, row: &Row, path: &str, before: Option<&Value>, after: Option<&Value>) {
        if self.processed.insert(row.index) {
            self.failed_rows.push(row.index);
            info!("row - {} : failed comparison", row.index);
        }

        let rows = self.failures_by_path.entry(normalize_path(path)).or_default();
        if !rows.contains(&row.index) {
            rows.push(row.index);
        }

        debug!(
            "row - {} : {} : {} => {}",
            row.index,
            path,
            display_value(before),
            display_value(after)
        );
    }

    fn success(&mut self, row: &Row) {
        if self.processed.insert(row.index) {
            self.success_count += 1;
        }
        info!("row - {} : success", row.index);
    }
}

fn display_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "(missing)".to_string(), Value::to_string)
}

fn join(rows: &[usize]) -> String {
    rows.iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "==========~  STATS  ~==========")?;
        writeln!(f)?;
        writeln!(f, "Total Processed: {}", self.total_processed)?;
        writeln!(f, "Success: {}", self.success)?;
        writeln!(f, "Failures: {}", self.failures)?;
        writeln!(f, "Rows failed: {}", join(&self.failed_rows))?;
        for (path, rows) in &self.failures_by_path {
            writeln!(f, "failures \"{}\": {}", path, join(rows))?;
        }
        writeln!(f)?;
        write!(f, "===============================")
    }
}

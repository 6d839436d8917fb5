//! Per-row comparison step

use crate::engine::Differ;
use apicmp_core::{ResponseHandler, ResponseRecord, Row, StatsSink, STATUS_CODE_PATH};
use serde_json::Value;
use tracing::trace;

/// Compares the two responses of a row and reports the outcome to a sink
///
/// Differing status codes are reported as a single failure at
/// `http.statusCode` and the bodies are not diffed; otherwise every body
/// divergence becomes one failure, and an empty diff is a success.
pub struct Comparer<S> {
    differ: Differ,
    stats: S,
}

impl<S: StatsSink> Comparer<S> {
    pub fn new(differ: Differ, stats: S) -> Self {
        Self { differ, stats }
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }

    pub fn into_stats(self) -> S {
        self.stats
    }

    /// Compare one row's responses
    pub fn compare(&mut self, row: &Row, before: &ResponseRecord, after: &ResponseRecord) {
        if before.status != after.status {
            self.stats.failure(
                row,
                STATUS_CODE_PATH,
                Some(&Value::from(before.status)),
                Some(&Value::from(after.status)),
            );
            return;
        }

        let divergences = self.differ.diff(&before.body, &after.body);
        trace!(row = row.index, count = divergences.len(), "row compared");

        if divergences.is_empty() {
            self.stats.success(row);
            return;
        }
        for divergence in &divergences {
            self.stats.failure(
                row,
                &divergence.path,
                divergence.before.as_ref(),
                divergence.after.as_ref(),
            );
        }
    }
}

impl<S: StatsSink> ResponseHandler for Comparer<S> {
    fn on_response(&mut self, row: &Row, before: &ResponseRecord, after: &ResponseRecord) {
        self.compare(row, before, after);
    }
}

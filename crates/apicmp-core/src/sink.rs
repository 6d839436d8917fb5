//! Consumers of comparison results

use crate::response::ResponseRecord;
use crate::row::Row;
use serde_json::Value;

/// Receives per-row outcomes of a comparison
///
/// Calls are serialized by the dispatcher, so implementations need no
/// internal locking. A row reported as failed more than once (one call per
/// divergence) must only be counted once.
pub trait StatsSink {
    /// Record one divergence for `row` at `path`
    fn failure(&mut self, row: &Row, path: &str, before: Option<&Value>, after: Option<&Value>);

    /// Record that `row` produced no divergence
    fn success(&mut self, row: &Row);
}

/// Callback invoked once per row when both hosts have answered
pub trait ResponseHandler {
    fn on_response(&mut self, row: &Row, before: &ResponseRecord, after: &ResponseRecord);
}

impl<F> ResponseHandler for F
where
    F: FnMut(&Row, &ResponseRecord, &ResponseRecord),
{
    fn on_response(&mut self, row: &Row, before: &ResponseRecord, after: &ResponseRecord) {
        self(row, before, after)
    }
}

//! Response captured from one host

use crate::request::RequestSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status and body returned by one host for one row, plus the request that
/// produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub status: u16,
    /// Parsed JSON body, or the raw text as a JSON string when the body is
    /// not valid JSON
    pub body: Value,
    pub request: RequestSpec,
}

impl ResponseRecord {
    pub fn new(status: u16, body: Value, request: RequestSpec) -> Self {
        Self {
            status,
            body,
            request,
        }
    }
}

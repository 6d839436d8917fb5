//! Core types for apicmp
//!
//! This crate provides the fundamental types shared by the dispatcher, the
//! diff engine and the reporting side: [`Row`], [`RequestSpec`],
//! [`ResponseRecord`], plus the hook traits that let callers plug custom
//! comparison, path exclusion and request rewriting into a run.

mod hooks;
mod request;
mod response;
mod row;
mod sink;

pub use hooks::{
    EqualityFn, ExactEquality, IgnorePredicate, NeverIgnore, NoopTransform, RequestTransform,
};
pub use request::{Method, RequestSpec};
pub use response::ResponseRecord;
pub use row::Row;
pub use sink::{ResponseHandler, StatsSink};

/// Row column holding the request path
pub const PATH_COLUMN: &str = "path";

/// Row column holding the HTTP method
pub const METHOD_COLUMN: &str = "method";

/// Row column holding the JSON request body
pub const BODY_COLUMN: &str = "body";

/// Failure path used when the two hosts answer with different status codes
pub const STATUS_CODE_PATH: &str = "http.statusCode";

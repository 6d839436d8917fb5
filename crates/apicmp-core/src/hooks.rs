//! Caller-supplied hooks
//!
//! A run can be customised with three hooks:
//! - [`EqualityFn`] decides whether two scalar values are equal
//! - [`IgnorePredicate`] excludes whole subtrees by path
//! - [`RequestTransform`] rewrites the per-host requests before dispatch
//!
//! Plain closures implement every hook, and each has a default
//! ([`ExactEquality`], [`NeverIgnore`], [`NoopTransform`]) used when the
//! caller supplies nothing.

use crate::request::RequestSpec;
use serde_json::Value;

/// Equality over scalar values found at `path`
pub trait EqualityFn: Send + Sync {
    fn equals(&self, before: &Value, after: &Value, path: &str) -> bool;
}

/// Path exclusion: returning true skips the subtree rooted at `path`
pub trait IgnorePredicate: Send + Sync {
    fn ignore(&self, path: &str) -> bool;
}

/// In-place rewrite of the two requests of a row before they are sent
pub trait RequestTransform: Send + Sync {
    fn transform(&self, before: &mut RequestSpec, after: &mut RequestSpec);
}

impl<F> EqualityFn for F
where
    F: Fn(&Value, &Value, &str) -> bool + Send + Sync,
{
    fn equals(&self, before: &Value, after: &Value, path: &str) -> bool {
        self(before, after, path)
    }
}

impl<F> IgnorePredicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn ignore(&self, path: &str) -> bool {
        self(path)
    }
}

impl<F> RequestTransform for F
where
    F: Fn(&mut RequestSpec, &mut RequestSpec) + Send + Sync,
{
    fn transform(&self, before: &mut RequestSpec, after: &mut RequestSpec) {
        self(before, after)
    }
}

/// Exact value equality
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactEquality;

impl EqualityFn for ExactEquality {
    fn equals(&self, before: &Value, after: &Value, _path: &str) -> bool {
        before == after
    }
}

/// Never excludes anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverIgnore;

impl IgnorePredicate for NeverIgnore {
    fn ignore(&self, _path: &str) -> bool {
        false
    }
}

/// Leaves both requests untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransform;

impl RequestTransform for NoopTransform {
    fn transform(&self, _before: &mut RequestSpec, _after: &mut RequestSpec) {}
}

//! Recursive JSON tree comparison

use apicmp_core::{EqualityFn, ExactEquality, IgnorePredicate, NeverIgnore};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What kind of difference was found at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DivergenceKind {
    /// Present in "before", absent in "after"
    Missing,
    /// Absent in "before", present in "after"
    Extra,
    /// Arrays of different lengths; carries both full arrays
    Length,
    /// Values of different JSON kinds (array, object, scalar)
    TypeMismatch,
    /// Scalars rejected by the equality function
    Value,
}

impl fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivergenceKind::Missing => f.pad("MISSING"),
            DivergenceKind::Extra => f.pad("EXTRA"),
            DivergenceKind::Length => f.pad("LENGTH"),
            DivergenceKind::TypeMismatch => f.pad("TYPE"),
            DivergenceKind::Value => f.pad("VALUE"),
        }
    }
}

/// A single difference between the two trees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divergence {
    pub path: String,
    pub kind: DivergenceKind,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl Divergence {
    fn new(
        path: &str,
        kind: DivergenceKind,
        before: Option<&Value>,
        after: Option<&Value>,
    ) -> Self {
        Self {
            path: path.to_string(),
            kind,
            before: before.cloned(),
            after: after.cloned(),
        }
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<Value>| match v {
            Some(v) => v.to_string(),
            None => "(missing)".to_string(),
        };
        write!(
            f,
            "[{:>7}] {} : {} => {}",
            self.kind,
            self.path,
            show(&self.before),
            show(&self.after)
        )
    }
}

/// Options for comparing two trees
#[derive(Clone)]
pub struct DiffOptions {
    /// Scalar equality, exact by default
    pub equality: Arc<dyn EqualityFn>,
    /// Subtree exclusion, checked at every depth
    pub ignore: Arc<dyn IgnorePredicate>,
    /// Whether "after" may carry structure "before" does not have
    pub superset: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            equality: Arc::new(ExactEquality),
            ignore: Arc::new(NeverIgnore),
            superset: false,
        }
    }
}

impl fmt::Debug for DiffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("superset", &self.superset)
            .finish_non_exhaustive()
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_equality(mut self, equality: Arc<dyn EqualityFn>) -> Self {
        self.equality = equality;
        self
    }

    pub fn with_ignore(mut self, ignore: Arc<dyn IgnorePredicate>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn superset(mut self, superset: bool) -> Self {
        self.superset = superset;
        self
    }
}

/// Depth-first structural differ
///
/// Holds only configuration; every call to [`Differ::diff`] builds its own
/// result list, so one differ can serve many rows.
#[derive(Debug, Clone, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// Compare two trees, returning divergences in walk order
    pub fn diff(&self, before: &Value, after: &Value) -> Vec<Divergence> {
        let mut out = Vec::new();
        self.walk("", Some(before), Some(after), &mut out);
        out
    }

    fn walk(
        &self,
        path: &str,
        before: Option<&Value>,
        after: Option<&Value>,
        out: &mut Vec<Divergence>,
    ) {
        if self.options.ignore.ignore(path) {
            return;
        }

        // null and a missing key are both "absent"
        let before = before.filter(|v| !v.is_null());
        let after = after.filter(|v| !v.is_null());

        let (before, after) = match (before, after) {
            (None, None) => return,
            (Some(b), None) => {
                out.push(Divergence::new(path, DivergenceKind::Missing, Some(b), None));
                return;
            }
            (None, Some(a)) => {
                if !self.options.superset {
                    out.push(Divergence::new(path, DivergenceKind::Extra, None, Some(a)));
                }
                return;
            }
            (Some(b), Some(a)) => (b, a),
        };

        match (before, after) {
            (Value::Array(b), Value::Array(a)) => {
                if b.len() != a.len() {
                    out.push(Divergence::new(
                        &length_path(path),
                        DivergenceKind::Length,
                        Some(before),
                        Some(after),
                    ));
                    return;
                }
                for (i, (bv, av)) in b.iter().zip(a).enumerate() {
                    self.walk(&format!("{}[{}]", path, i), Some(bv), Some(av), out);
                }
            }
            (Value::Object(b), Value::Object(a)) => {
                for (key, bv) in b {
                    self.walk(&child_path(path, key), Some(bv), a.get(key), out);
                }
                if !self.options.superset {
                    for (key, av) in a {
                        if !b.contains_key(key) {
                            self.walk(&child_path(path, key), None, Some(av), out);
                        }
                    }
                }
            }
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                out.push(Divergence::new(
                    path,
                    DivergenceKind::TypeMismatch,
                    Some(before),
                    Some(after),
                ));
            }
            _ => {
                if !self.options.equality.equals(before, after, path) {
                    out.push(Divergence::new(
                        path,
                        DivergenceKind::Value,
                        Some(before),
                        Some(after),
                    ));
                }
            }
        }
    }
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn length_path(path: &str) -> String {
    child_path(path, "length")
}

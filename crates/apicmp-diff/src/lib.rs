//! Structural diff of API responses
//!
//! [`Differ`] walks two JSON trees depth-first and returns every place where
//! they diverge, addressed by a dotted path (`user.roles[2].name`).
//! [`Comparer`] is the per-row comparison step that sits between the
//! dispatcher and a [`StatsSink`](apicmp_core::StatsSink): it checks status
//! codes, diffs bodies and reports the outcome.
//!
//! ```
//! use apicmp_diff::{DiffOptions, Differ};
//! use serde_json::json;
//!
//! let differ = Differ::new(DiffOptions::default());
//! let diffs = differ.diff(&json!({"a": {"b": 1}}), &json!({"a": {"b": 2}}));
//! assert_eq!(diffs.len(), 1);
//! assert_eq!(diffs[0].path, "a.b");
//! ```

mod compare;
mod engine;

pub use compare::Comparer;
pub use engine::{DiffOptions, Differ, Divergence, DivergenceKind};

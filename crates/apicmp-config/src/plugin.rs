//! Plugin files
//!
//! A plugin is a YAML file that customises comparison and request building
//! without code:
//!
//! ```yaml
//! ignore:
//!   - meta.generated_at
//!   - items[n].etag
//!   - "*.trace_id"
//! float_tolerance: 0.001
//! case_insensitive: true
//! known_headers: [X-Tenant]
//! header_prefixes: [X-Feature-]
//! headers:
//!   before:
//!     Authorization: Bearer old-token
//!   after:
//!     Authorization: Bearer new-token
//! ```
//!
//! The file is validated when it is loaded, so a bad plugin stops the run
//! before any request is sent.

use crate::error::{ConfigError, ConfigResult};
use apicmp_core::{
    EqualityFn, ExactEquality, IgnorePredicate, NeverIgnore, RequestSpec, RequestTransform,
};
use apicmp_dispatch::{validate_header, KnownHeaders};
use indexmap::IndexMap;
use regex::RegexSet;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Raw contents of a plugin file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginConfig {
    /// Path patterns whose subtrees are never compared
    pub ignore: Vec<String>,
    /// Largest absolute difference at which two numbers still count as equal
    pub float_tolerance: Option<f64>,
    /// Compare strings ignoring ASCII case
    pub case_insensitive: bool,
    /// Extra row columns forwarded as headers
    pub known_headers: Vec<String>,
    /// Column prefixes forwarded as headers
    pub header_prefixes: Vec<String>,
    /// Host-specific headers
    pub headers: HostHeaders,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostHeaders {
    pub before: IndexMap<String, String>,
    pub after: IndexMap<String, String>,
}

/// Hooks built from a plugin file, ready to hand to the differ and the
/// dispatcher
#[derive(Clone)]
pub struct Plugin {
    pub equality: Arc<dyn EqualityFn>,
    pub ignore: Arc<dyn IgnorePredicate>,
    pub transform: Option<Arc<dyn RequestTransform>>,
    pub known_headers: KnownHeaders,
}

impl Default for Plugin {
    fn default() -> Self {
        Self {
            equality: Arc::new(ExactEquality),
            ignore: Arc::new(NeverIgnore),
            transform: None,
            known_headers: KnownHeaders::default(),
        }
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("transform", &self.transform.is_some())
            .field("known_headers", &self.known_headers)
            .finish_non_exhaustive()
    }
}

impl Plugin {
    /// Load and validate a plugin file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading plugin: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: PluginConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParsePlugin {
                path: path.to_path_buf(),
                source: e,
            })?;

        Self::from_config(config)
    }

    /// Build hooks from already-parsed plugin settings
    pub fn from_config(config: PluginConfig) -> ConfigResult<Self> {
        let mut plugin = Self::default();

        if !config.ignore.is_empty() {
            plugin.ignore = Arc::new(PathPatternIgnore::new(&config.ignore)?);
        }

        if let Some(tolerance) = config.float_tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: "float_tolerance".to_string(),
                    reason: "must be a finite, non-negative number".to_string(),
                });
            }
        }
        if config.float_tolerance.is_some() || config.case_insensitive {
            plugin.equality = Arc::new(TolerantEquality {
                tolerance: config.float_tolerance.unwrap_or(0.0),
                case_insensitive: config.case_insensitive,
            });
        }

        let HostHeaders { before, after } = config.headers;
        for (name, value) in before.iter().chain(after.iter()) {
            validate_header(name, value).map_err(|reason| ConfigError::InvalidHeader {
                header: format!("{}: {}", name, value),
                reason,
            })?;
        }
        if !before.is_empty() || !after.is_empty() {
            plugin.transform = Some(Arc::new(HostHeaderTransform { before, after }));
        }

        for name in &config.known_headers {
            validate_header(name, "").map_err(|reason| ConfigError::InvalidHeader {
                header: name.clone(),
                reason,
            })?;
        }
        plugin.known_headers.exact.extend(config.known_headers);
        plugin.known_headers.prefixes.extend(config.header_prefixes);

        Ok(plugin)
    }
}

/// Ignores every path matching one of a set of patterns
///
/// Patterns match whole paths. `*` stands for one object key and `[n]` (or
/// `[*]`) for any array index; everything else is literal.
#[derive(Debug, Clone)]
pub struct PathPatternIgnore {
    patterns: RegexSet,
}

impl PathPatternIgnore {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> ConfigResult<Self> {
        let mut regexes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.trim().is_empty() {
                return Err(ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "pattern cannot be empty".to_string(),
                });
            }
            regexes.push(pattern_to_regex(pattern));
        }

        let patterns = RegexSet::new(&regexes).map_err(|e| ConfigError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
            reason: e.to_string(),
        })?;
        Ok(Self { patterns })
    }
}

impl IgnorePredicate for PathPatternIgnore {
    fn ignore(&self, path: &str) -> bool {
        self.patterns.is_match(path)
    }
}

fn pattern_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if let Some(tail) = rest
            .strip_prefix("[n]")
            .or_else(|| rest.strip_prefix("[*]"))
        {
            regex.push_str(r"\[[0-9]+\]");
            rest = tail;
        } else if ch == '*' {
            regex.push_str(r"[^.\[\]]+");
            rest = &rest[1..];
        } else {
            regex.push_str(&regex::escape(&ch.to_string()));
            rest = &rest[ch.len_utf8()..];
        }
    }
    regex.push('$');
    regex
}

/// Equality with a numeric tolerance and optional case-insensitive strings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TolerantEquality {
    pub tolerance: f64,
    pub case_insensitive: bool,
}

impl EqualityFn for TolerantEquality {
    fn equals(&self, before: &Value, after: &Value, _path: &str) -> bool {
        match (before, after) {
            (Value::Number(b), Value::Number(a)) => match (b.as_f64(), a.as_f64()) {
                (Some(b), Some(a)) => (b - a).abs() <= self.tolerance,
                _ => b == a,
            },
            (Value::String(b), Value::String(a)) if self.case_insensitive => {
                b.eq_ignore_ascii_case(a)
            }
            _ => before == after,
        }
    }
}

/// Adds host-specific headers to each side of a row
#[derive(Debug, Clone, Default)]
pub struct HostHeaderTransform {
    pub before: IndexMap<String, String>,
    pub after: IndexMap<String, String>,
}

impl RequestTransform for HostHeaderTransform {
    fn transform(&self, before: &mut RequestSpec, after: &mut RequestSpec) {
        for (name, value) in &self.before {
            before.set_header(name.as_str(), value.as_str());
        }
        for (name, value) in &self.after {
            after.set_header(name.as_str(), value.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apicmp_core::Method;
    use serde_json::json;

    #[test]
    fn test_pattern_matching() {
        let ignore = PathPatternIgnore::new(&["meta.generated_at", "items[n].etag", "*.trace_id"])
            .unwrap();

        assert!(ignore.ignore("meta.generated_at"));
        assert!(ignore.ignore("items[0].etag"));
        assert!(ignore.ignore("items[12].etag"));
        assert!(ignore.ignore("user.trace_id"));

        assert!(!ignore.ignore("meta"));
        assert!(!ignore.ignore("meta.generated_at_extra"));
        assert!(!ignore.ignore("items.etag"));
        assert!(!ignore.ignore("a.b.trace_id"));
        assert!(!ignore.ignore("items[0].etags"));
    }

    #[test]
    fn test_pattern_literals_are_escaped() {
        let ignore = PathPatternIgnore::new(&["a+b.c"]).unwrap();
        assert!(ignore.ignore("a+b.c"));
        assert!(!ignore.ignore("aab.c"));
        assert!(!ignore.ignore("a+bxc"));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(matches!(
            PathPatternIgnore::new(&[" "]),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_tolerant_equality() {
        let eq = TolerantEquality {
            tolerance: 0.01,
            case_insensitive: true,
        };
        assert!(eq.equals(&json!(1.0), &json!(1.005), "price"));
        assert!(eq.equals(&json!(1), &json!(1.0), "count"));
        assert!(!eq.equals(&json!(1.0), &json!(1.02), "price"));
        assert!(eq.equals(&json!("Admin"), &json!("admin"), "role"));
        assert!(!eq.equals(&json!("1"), &json!(1), "id"));

        let strict = TolerantEquality {
            tolerance: 0.0,
            case_insensitive: false,
        };
        assert!(!strict.equals(&json!("Admin"), &json!("admin"), "role"));
    }

    #[test]
    fn test_from_config() {
        let config: PluginConfig = serde_yaml::from_str(
            r#"
ignore: [meta]
float_tolerance: 0.5
known_headers: [X-Tenant]
header_prefixes: [X-Feature-]
headers:
  after:
    Authorization: Bearer new
"#,
        )
        .unwrap();
        let plugin = Plugin::from_config(config).unwrap();

        assert!(plugin.ignore.ignore("meta"));
        assert!(plugin.equality.equals(&json!(1.0), &json!(1.4), "x"));
        assert_eq!(
            plugin.known_headers.exact,
            vec!["X-Api-Key", "X-User-Dma", "X-Tenant"]
        );
        assert_eq!(plugin.known_headers.prefixes, vec!["X-Feature-"]);

        let transform = plugin.transform.expect("transform configured");
        let mut before = RequestSpec::new(Method::Get, "http://before/x");
        let mut after = RequestSpec::new(Method::Get, "http://after/x");
        transform.transform(&mut before, &mut after);
        assert_eq!(before.header("Authorization"), None);
        assert_eq!(after.header("Authorization"), Some("Bearer new"));
    }

    #[test]
    fn test_unsendable_plugin_headers() {
        let config: PluginConfig = serde_yaml::from_str(
            r#"
headers:
  before:
    "X(Name)": v
"#,
        )
        .unwrap();
        assert!(matches!(
            Plugin::from_config(config),
            Err(ConfigError::InvalidHeader { .. })
        ));

        let config: PluginConfig = serde_yaml::from_str(
            r#"
headers:
  after:
    Authorization: "Bearer \u0001"
"#,
        )
        .unwrap();
        assert!(Plugin::from_config(config).is_err());

        let config = PluginConfig {
            known_headers: vec!["Tenant Id".to_string()],
            ..PluginConfig::default()
        };
        assert!(matches!(
            Plugin::from_config(config),
            Err(ConfigError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        let config = PluginConfig {
            float_tolerance: Some(-1.0),
            ..PluginConfig::default()
        };
        assert!(matches!(
            Plugin::from_config(config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<PluginConfig, _> = serde_yaml::from_str("ignores: [meta]\n");
        assert!(result.is_err());
    }
}

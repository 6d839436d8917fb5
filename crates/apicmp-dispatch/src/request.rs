//! Building per-host requests from recorded rows

use apicmp_core::{Method, RequestSpec, Row, BODY_COLUMN, METHOD_COLUMN};
use reqwest::header::{HeaderName, HeaderValue};
use tracing::warn;

/// Row columns copied as request headers when present
pub const DEFAULT_KNOWN_HEADERS: &[&str] = &["X-Api-Key", "X-User-Dma"];

/// Check that `name: value` can be sent as an HTTP header
pub fn validate_header(name: &str, value: &str) -> Result<(), String> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| format!("'{}' is not a valid header name", name))?;
    HeaderValue::from_str(value)
        .map_err(|_| format!("value of '{}' contains characters not allowed in a header", name))?;
    Ok(())
}

/// Allow-list of row columns that are forwarded as headers
///
/// A column matches when its name equals one of `exact` or starts with one
/// of `prefixes`, ignoring ASCII case. Matching columns are copied verbatim:
/// the column name becomes the header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownHeaders {
    pub exact: Vec<String>,
    pub prefixes: Vec<String>,
}

impl Default for KnownHeaders {
    fn default() -> Self {
        Self {
            exact: DEFAULT_KNOWN_HEADERS.iter().map(|h| h.to_string()).collect(),
            prefixes: Vec::new(),
        }
    }
}

impl KnownHeaders {
    fn matches_prefix(&self, column: &str) -> bool {
        let column = column.to_ascii_lowercase();
        self.prefixes
            .iter()
            .any(|p| !p.is_empty() && column.starts_with(&p.to_ascii_lowercase()))
    }

    /// Header pairs taken from `row`, exact names first, then prefix
    /// matches sorted by column name. Cells that cannot be sent as a header
    /// are dropped.
    fn extract(&self, row: &Row) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        for name in &self.exact {
            if let Some((column, value)) = row
                .data
                .iter()
                .find(|(k, v)| k.eq_ignore_ascii_case(name) && !v.is_empty())
            {
                headers.push((column.clone(), value.clone()));
            }
        }

        let mut prefixed: Vec<_> = row
            .data
            .iter()
            .filter(|(k, v)| {
                !v.is_empty()
                    && self.matches_prefix(k)
                    && !self.exact.iter().any(|e| e.eq_ignore_ascii_case(k))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        prefixed.sort();
        headers.extend(prefixed);

        headers.retain(|(name, value)| match validate_header(name, value) {
            Ok(()) => true,
            Err(reason) => {
                warn!(row = row.index, "{}, dropping header", reason);
                false
            }
        });
        headers
    }
}

/// Turns a row into the request sent to one host
#[derive(Debug, Clone, Default)]
pub struct RequestFactory {
    headers: Vec<(String, String)>,
    known_headers: KnownHeaders,
}

impl RequestFactory {
    pub fn new(headers: Vec<(String, String)>, known_headers: KnownHeaders) -> Self {
        Self {
            headers,
            known_headers,
        }
    }

    /// Build the request for `row` against `host`
    ///
    /// The URL is the host followed verbatim by the row path. Custom headers
    /// go first, then allow-listed row columns; a `body` column implies a
    /// JSON content type.
    pub fn build(&self, host: &str, row: &Row) -> RequestSpec {
        let method = match row.get(METHOD_COLUMN) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                warn!(row = row.index, "{}, falling back to GET", err);
                Method::Get
            }),
            None => Method::Get,
        };

        let mut spec = RequestSpec::new(method, format!("{}{}", host, row.path().unwrap_or("")));
        for (name, value) in &self.headers {
            spec.set_header(name.as_str(), value.as_str());
        }
        for (name, value) in self.known_headers.extract(row) {
            spec.set_header(name, value);
        }
        if let Some(body) = row.get(BODY_COLUMN) {
            spec.set_header("Content-Type", "application/json");
            spec.body = Some(body.to_string());
        }
        spec
    }

    /// Build independent requests for both hosts
    pub fn build_pair(&self, before: &str, after: &str, row: &Row) -> (RequestSpec, RequestSpec) {
        (self.build(before, row), self.build(after, row))
    }
}

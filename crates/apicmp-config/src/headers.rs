//! `key: value` header parsing

use crate::error::{ConfigError, ConfigResult};
use apicmp_dispatch::validate_header;

/// Header sent to both hosts when nothing else is configured
pub const DEFAULT_HEADER: &str = "Cache-Control: no-cache";

/// Parse one `key: value` header
pub fn parse_header(raw: &str) -> ConfigResult<(String, String)> {
    let invalid = |reason: String| ConfigError::InvalidHeader {
        header: raw.to_string(),
        reason,
    };
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| invalid("expected 'key: value'".to_string()))?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() {
        return Err(invalid("expected 'key: value'".to_string()));
    }
    validate_header(name, value).map_err(invalid)?;
    Ok((name.to_string(), value.to_string()))
}

/// Parse every header, failing on the first malformed one
pub fn parse_headers<'a>(
    raw: impl IntoIterator<Item = &'a str>,
) -> ConfigResult<Vec<(String, String)>> {
    raw.into_iter().map(parse_header).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header(DEFAULT_HEADER).unwrap(),
            ("Cache-Control".to_string(), "no-cache".to_string())
        );
        assert_eq!(
            parse_header("Authorization:Bearer a:b").unwrap(),
            ("Authorization".to_string(), "Bearer a:b".to_string())
        );
    }

    #[test]
    fn test_invalid_headers() {
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header(": value").is_err());
        assert!(parse_header("Bad Name: value").is_err());
        assert!(parse_headers(["A: 1", "oops"]).is_err());
    }

    #[test]
    fn test_unsendable_headers() {
        assert!(matches!(
            parse_header("X(Name): v"),
            Err(ConfigError::InvalidHeader { .. })
        ));
        assert!(parse_header("X-Token: a\u{1}b").is_err());
    }
}

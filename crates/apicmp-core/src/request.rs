//! Outgoing request for one host

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a recorded row may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Trace,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
            Method::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "TRACE" => Ok(Method::Trace),
            "OPTIONS" => Ok(Method::Options),
            other => Err(format!("unsupported HTTP method '{}'", other)),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request for a single host
///
/// Each host gets its own copy, so a request transform that rewrites one side
/// never leaks into the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: IndexMap::new(),
            body: None,
        }
    }

    /// Set a header, replacing any previous value with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if let Some(existing) = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&name))
            .cloned()
        {
            self.headers.shift_remove(&existing);
        }
        self.headers.insert(name, value.into());
    }

    /// Get a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render the request as an equivalent curl invocation, for debug logs
    pub fn to_curl(&self) -> String {
        let mut cmd = format!("curl --location --request {} '{}'", self.method, self.url);
        for (name, value) in &self.headers {
            cmd.push_str(&format!(" \\\n--header '{}: {}'", name, value));
        }
        if let Some(body) = &self.body {
            cmd.push_str(&format!(" \\\n--data-raw '{}'", body.replace('\'', "'\\''")));
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Options".parse::<Method>().unwrap(), Method::Options);
        assert!("CONNECT".parse::<Method>().is_err());
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut spec = RequestSpec::new(Method::Get, "http://before/users");
        spec.set_header("authorization", "Bearer a");
        spec.set_header("Authorization", "Bearer b");
        assert_eq!(spec.headers.len(), 1);
        assert_eq!(spec.header("AUTHORIZATION"), Some("Bearer b"));
    }

    #[test]
    fn test_to_curl() {
        let mut spec = RequestSpec::new(Method::Post, "http://before/users");
        spec.set_header("Content-Type", "application/json");
        spec.body = Some(r#"{"name":"o'neil"}"#.to_string());

        let curl = spec.to_curl();
        assert!(curl.starts_with("curl --location --request POST 'http://before/users'"));
        assert!(curl.contains("--header 'Content-Type: application/json'"));
        assert!(curl.contains(r#"--data-raw '{"name":"o'\''neil"}'"#));
    }
}

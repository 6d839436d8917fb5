//! Configuration loading for apicmp
//!
//! This crate turns the inputs of a run into the types the engines consume:
//!
//! - CSV files into filtered [`Row`](apicmp_core::Row)s ([`read_rows`])
//! - `key: value` strings into header pairs ([`parse_headers`])
//! - YAML plugin files into comparison and request hooks ([`Plugin`])
//!
//! Everything here fails eagerly with a [`ConfigError`], before any request
//! is sent.
//!
//! # Example
//!
//! ```ignore
//! use apicmp_config::{parse_headers, read_rows, Plugin};
//!
//! let rows = read_rows("fixtures.csv", &[])?;
//! let headers = parse_headers(["Cache-Control: no-cache"])?;
//! let plugin = Plugin::load("plugin.yaml")?;
//! ```

mod error;
mod headers;
mod plugin;
mod rows;

pub use error::{ConfigError, ConfigResult};
pub use headers::{parse_header, parse_headers, DEFAULT_HEADER};
pub use plugin::{
    HostHeaderTransform, HostHeaders, PathPatternIgnore, Plugin, PluginConfig, TolerantEquality,
};
pub use rows::{parse_rows, read_rows};

//! HTTP transport abstraction

use apicmp_core::{Method, RequestSpec};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Status and body of a received response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Parse a raw body as JSON, keeping it as a string when it is not
    pub fn from_raw(status: u16, raw: String) -> Self {
        let body = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        Self { status, body }
    }
}

/// Failure to obtain any response
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Connection(String),
}

/// Sends one request and waits for its response
///
/// Any HTTP status counts as a response; errors are reserved for requests
/// that got no answer at all. Cancellation is handled by the caller, which
/// drops the returned future.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Trace => reqwest::Method::TRACE,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let raw = response.text().await?;

        Ok(HttpResponse::from_raw(status, raw))
    }
}

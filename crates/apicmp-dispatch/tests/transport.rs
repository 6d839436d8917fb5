//! Tests for the reqwest transport against a local HTTP endpoint
//!
//! Each test starts a one-shot server on an ephemeral port that captures the
//! raw request and answers with a canned response.

use apicmp_core::{Method, RequestSpec};
use apicmp_dispatch::{HttpTransport, Transport, TransportError};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn transport() -> HttpTransport {
    // Local endpoints must not go through a proxy from the environment
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(client)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve one request, returning the base URL and the captured raw request
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_request_is_forwarded_and_error_status_is_a_response() {
    let (base, server) = serve_once(
        "500 Internal Server Error",
        "application/json",
        r#"{"error":"boom"}"#,
    )
    .await;

    let mut request = RequestSpec::new(Method::Put, format!("{}/items/7", base));
    request.set_header("X-Api-Key", "secret");
    request.set_header("Content-Type", "application/json");
    request.body = Some(r#"{"name":"ana"}"#.to_string());

    let response = transport().send(&request).await.unwrap();
    assert_eq!(response.status, 500);
    assert_eq!(response.body, json!({"error": "boom"}));

    let raw = server.await.unwrap();
    let lower = raw.to_ascii_lowercase();
    assert!(lower.starts_with("put /items/7 http/1.1\r\n"), "{}", raw);
    assert!(lower.contains("\r\nx-api-key: secret\r\n"), "{}", raw);
    assert!(lower.contains("\r\ncontent-type: application/json\r\n"), "{}", raw);
    assert!(raw.ends_with("\r\n\r\n{\"name\":\"ana\"}"), "{}", raw);
}

#[tokio::test]
async fn test_non_json_body_is_kept_as_text() {
    let (base, server) = serve_once("200 OK", "text/plain", "deleted").await;

    let request = RequestSpec::new(Method::Delete, format!("{}/items/7", base));
    let response = transport().send(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!("deleted"));

    let raw = server.await.unwrap();
    assert!(raw.starts_with("DELETE /items/7 HTTP/1.1\r\n"), "{}", raw);
}

#[tokio::test]
async fn test_refused_connection_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = RequestSpec::new(Method::Get, format!("http://{}/items/7", addr));
    let result = transport().send(&request).await;
    assert!(matches!(result, Err(TransportError::Http(_))));
}

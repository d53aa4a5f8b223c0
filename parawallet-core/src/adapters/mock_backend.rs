//! Mock wallet backend for testing
//!
//! A tiny HTTP/1.1 server on a random local port that answers the four
//! wallet endpoints the way the real backend does:
//! - POST /signup returns { wallet_address }
//! - POST /login  returns { accessToken, user: { email } } or 401 { error }
//! - GET  /wallet returns { address, balance_eth } (bearer required)
//! - POST /send   returns { transaction_hash } (bearer required)
//!
//! Every request is recorded so tests can assert on headers and bodies.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::json;

/// Mock backend server
pub struct MockWalletBackend {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Behaviour knobs for the mock
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Password accepted by /login
    pub valid_password: String,
    pub access_token: String,
    pub wallet_address: String,
    /// Raw JSON for `balance_eth` (number or string)
    pub balance_eth: serde_json::Value,
    pub transaction_hash: String,
    /// /send answers 400 { error: "Insufficient funds" }
    pub fail_send: bool,
    /// Every route answers 500 with an empty JSON object
    pub fail_without_message: bool,
    /// Success bodies are not JSON
    pub malformed_success: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            valid_password: "pw123456".to_string(),
            access_token: "mock_access_token".to_string(),
            wallet_address: "0xABC".to_string(),
            balance_eth: json!("0.5"),
            transaction_hash: "0x123".to_string(),
            fail_send: false,
            fail_without_message: false,
            malformed_success: false,
            delay_ms: 0,
        }
    }
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl MockWalletBackend {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking so stop() is noticed
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = requests_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &log);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockWalletBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read headers and a Content-Length body off the stream
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    stream.set_nonblocking(false).ok()?;
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body_end = (header_end + content_length).min(data.len());
    let body = String::from_utf8_lossy(&data[header_end..body_end]).to_string();
    Some((head, body))
}

fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().find_map(|line| {
        let (n, v) = line.split_once(':')?;
        if n.trim().eq_ignore_ascii_case(name) {
            Some(v.trim().to_string())
        } else {
            None
        }
    })
}

fn handle_connection(
    mut stream: TcpStream,
    config: &MockConfig,
    log: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    }

    let method = parts[0].to_string();
    let path = parts[1].split('?').next().unwrap_or(parts[1]).to_string();
    let authorization = header_value(&head, "authorization");

    if let Ok(mut requests) = log.lock() {
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            authorization: authorization.clone(),
            content_type: header_value(&head, "content-type"),
            body: body.clone(),
        });
    }

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    if config.fail_without_message {
        send_response(&mut stream, 500, "Internal Server Error", "{}");
        return;
    }

    let expected_auth = format!("Bearer {}", config.access_token);
    let authorized = authorization.as_deref() == Some(expected_auth.as_str());
    let request_json: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();

    let success = |stream: &mut TcpStream, payload: serde_json::Value| {
        if config.malformed_success {
            send_response(stream, 200, "OK", "<html>ok</html>");
        } else {
            send_response(stream, 200, "OK", &payload.to_string());
        }
    };

    match (method.as_str(), path.as_str()) {
        ("POST", "/signup") => {
            if request_json.get("email").and_then(|v| v.as_str()).unwrap_or("").is_empty() {
                send_response(&mut stream, 400, "Bad Request", r#"{"error": "Email is required"}"#);
                return;
            }
            success(&mut stream, json!({ "wallet_address": config.wallet_address }));
        }
        ("POST", "/login") => {
            let password = request_json.get("password").and_then(|v| v.as_str());
            if password != Some(config.valid_password.as_str()) {
                send_response(&mut stream, 401, "Unauthorized", r#"{"error": "Invalid credentials"}"#);
                return;
            }
            let email = request_json.get("email").cloned().unwrap_or_default();
            success(
                &mut stream,
                json!({
                    "accessToken": config.access_token,
                    "refreshToken": "mock_refresh_token",
                    "user": { "id": "user-1", "email": email }
                }),
            );
        }
        ("GET", "/wallet") => {
            if !authorized {
                send_response(&mut stream, 401, "Unauthorized", r#"{"error": "Unauthorized"}"#);
                return;
            }
            success(
                &mut stream,
                json!({ "address": config.wallet_address, "balance_eth": config.balance_eth }),
            );
        }
        ("POST", "/send") => {
            if !authorized {
                send_response(&mut stream, 401, "Unauthorized", r#"{"error": "Unauthorized"}"#);
                return;
            }
            if config.fail_send {
                send_response(&mut stream, 400, "Bad Request", r#"{"error": "Insufficient funds"}"#);
                return;
            }
            success(&mut stream, json!({ "transaction_hash": config.transaction_hash }));
        }
        _ => {
            send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#);
        }
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::*;
    use crate::adapters::http::HttpWalletApi;
    use crate::domain::result::Error;
    use crate::domain::{Credentials, TransferRequest};
    use crate::ports::WalletApi;

    fn client(server: &MockWalletBackend) -> HttpWalletApi {
        HttpWalletApi::new(&server.base_url(), Some(Duration::from_secs(5))).unwrap()
    }

    #[tokio::test]
    async fn test_signup_returns_wallet_address() {
        let server = MockWalletBackend::start(MockConfig::default()).unwrap();
        let api = client(&server);

        let receipt = api
            .create_account(&Credentials::new("a@b.com", "pw123456"))
            .await
            .unwrap();
        assert_eq!(receipt.wallet_address, "0xABC");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/signup");
        assert!(requests[0].authorization.is_none());
        assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "password": "pw123456"}));
    }

    #[tokio::test]
    async fn test_login_success_and_identity() {
        let server = MockWalletBackend::start(MockConfig::default()).unwrap();
        let api = client(&server);

        let grant = api
            .authenticate(&Credentials::new("a@b.com", "pw123456"))
            .await
            .unwrap();
        assert_eq!(grant.access_token, "mock_access_token");
        assert_eq!(grant.account_identifier.as_deref(), Some("a@b.com"));
        assert!(server.requests()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password_uses_backend_message() {
        let server = MockWalletBackend::start(MockConfig::default()).unwrap();
        let api = client(&server);

        let err = api
            .authenticate(&Credentials::new("a@b.com", "wrongpw"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_wallet_sends_bearer_token() {
        let server = MockWalletBackend::start(MockConfig {
            balance_eth: json!(1.5),
            ..Default::default()
        })
        .unwrap();
        let api = client(&server);

        let snapshot = api.fetch_wallet("mock_access_token").await.unwrap();
        assert_eq!(snapshot.address, "0xABC");
        assert_eq!(snapshot.balance_eth, Decimal::new(15, 1));

        let requests = server.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer mock_access_token"));
    }

    #[tokio::test]
    async fn test_wallet_with_bad_token() {
        let server = MockWalletBackend::start(MockConfig::default()).unwrap();
        let api = client(&server);

        let err = api.fetch_wallet("stale").await.unwrap_err();
        assert!(matches!(err, Error::Wallet(_)));
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_send_success_and_body() {
        let server = MockWalletBackend::start(MockConfig {
            transaction_hash: "0x123def".to_string(),
            ..Default::default()
        })
        .unwrap();
        let api = client(&server);

        let result = api
            .submit_transfer("mock_access_token", &TransferRequest::new("0xDEF", "0.01"))
            .await
            .unwrap();
        assert_eq!(result.transaction_hash, "0x123def");

        let requests = server.requests();
        assert_eq!(requests[0].path, "/send");
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, json!({"to": "0xDEF", "amount": "0.01"}));
    }

    #[tokio::test]
    async fn test_send_failure_message() {
        let server = MockWalletBackend::start(MockConfig {
            fail_send: true,
            ..Default::default()
        })
        .unwrap();
        let api = client(&server);

        let err = api
            .submit_transfer("mock_access_token", &TransferRequest::new("0xDEF", "100"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
        assert_eq!(err.to_string(), "Insufficient funds");
    }

    #[tokio::test]
    async fn test_fallback_messages_without_backend_error() {
        let server = MockWalletBackend::start(MockConfig {
            fail_without_message: true,
            ..Default::default()
        })
        .unwrap();
        let api = client(&server);
        let creds = Credentials::new("a@b.com", "pw123456");

        assert_eq!(api.create_account(&creds).await.unwrap_err().to_string(), "Signup failed");
        assert_eq!(api.authenticate(&creds).await.unwrap_err().to_string(), "Login failed");
        assert_eq!(
            api.fetch_wallet("mock_access_token").await.unwrap_err().to_string(),
            "Failed to fetch wallet"
        );
        assert_eq!(
            api.submit_transfer("mock_access_token", &TransferRequest::new("0xDEF", "1"))
                .await
                .unwrap_err()
                .to_string(),
            "Transaction failed"
        );
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockWalletBackend::start(MockConfig {
            malformed_success: true,
            ..Default::default()
        })
        .unwrap();
        let api = client(&server);

        let err = api.fetch_wallet("mock_access_token").await.unwrap_err();
        assert!(matches!(err, Error::Wallet(_)));
        assert!(err.to_string().contains("Malformed"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let server = MockWalletBackend::start(MockConfig::default()).unwrap();
        let url = server.base_url();
        drop(server);

        let api = HttpWalletApi::new(&url, Some(Duration::from_secs(5))).unwrap();
        let err = api
            .authenticate(&Credentials::new("a@b.com", "pw123456"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockWalletBackend::start(MockConfig {
            delay_ms: 1500,
            ..Default::default()
        })
        .unwrap();
        let api = HttpWalletApi::new(&server.base_url(), Some(Duration::from_millis(200))).unwrap();

        let err = api.fetch_wallet("mock_access_token").await.unwrap_err();
        assert!(matches!(err, Error::Wallet(_)));
        assert!(err.to_string().contains("timed out"));
    }
}

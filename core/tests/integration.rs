//! Request sending against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background thread, then
//! drives `send` and `RequestSender` over real HTTP. The mock server's
//! `/echo` and `/hits` routes show what actually went over the wire.

use std::net::SocketAddr;

use mock_server::Echo;
use reqkit_core::{send, Headers, HttpMethod, RequestError, RequestSender, SenderConfig, StatusPolicy};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn literal() -> RequestSender {
    RequestSender::new(SenderConfig::default().with_status_policy(StatusPolicy::Literal))
}

fn echo(body: Vec<u8>) -> Echo {
    serde_json::from_slice(&body).unwrap()
}

#[test]
fn get_ok_returns_body() {
    let addr = start_server();
    let body = send(HttpMethod::Get, &format!("http://{addr}/ok"), "", None).unwrap();
    assert_eq!(body, b"ok");
}

#[test]
fn not_found_error_mentions_status_and_dumps() {
    let addr = start_server();
    let err = send(HttpMethod::Get, &format!("http://{addr}/status/404"), "", None).unwrap_err();

    assert_eq!(err.status(), Some(404));
    let msg = err.to_string();
    assert!(msg.contains("404"));
    assert!(msg.contains("REQUEST: GET /status/404 HTTP/1.1"));
    assert!(msg.contains("RESPONSE: HTTP/1.1 404 Not Found"));
    assert!(msg.ends_with("status 404"));
}

#[test]
fn redirect_is_an_error_under_both_policies() {
    let addr = start_server();
    let url = format!("http://{addr}/status/301");

    let err = literal().send(HttpMethod::Get, &url, "", None).unwrap_err();
    assert_eq!(err.status(), Some(301));

    let err = send(HttpMethod::Get, &url, "", None).unwrap_err();
    assert_eq!(err.status(), Some(301));
    assert!(err.to_string().contains("location: /ok"));
}

#[test]
fn status_300_passes_only_under_literal_policy() {
    let addr = start_server();
    let url = format!("http://{addr}/status/300");

    let body = literal().send(HttpMethod::Get, &url, "", None).unwrap();
    assert_eq!(body, b"status 300");

    let err = send(HttpMethod::Get, &url, "", None).unwrap_err();
    assert_eq!(err.status(), Some(300));
}

#[test]
fn non_2xx_success_codes_return_body() {
    let addr = start_server();
    let body = send(HttpMethod::Post, &format!("http://{addr}/status/202"), "job", None).unwrap();
    assert_eq!(body, b"status 202");
}

#[test]
fn failed_status_is_not_retried() {
    let addr = start_server();
    let err = send(HttpMethod::Put, &format!("http://{addr}/status/503"), "x", None).unwrap_err();
    assert_eq!(err.status(), Some(503));

    let hits = send(HttpMethod::Get, &format!("http://{addr}/hits/503"), "", None).unwrap();
    assert_eq!(hits, b"1");
}

#[test]
fn headers_reach_the_server_verbatim() {
    let addr = start_server();
    let mut headers = Headers::new();
    headers.insert("X-Trace-Id".to_string(), "abc 123".to_string());
    headers.insert("Accept-Language".to_string(), "en-GB".to_string());

    let body = send(HttpMethod::Get, &format!("http://{addr}/echo"), "", Some(&headers)).unwrap();
    let seen = echo(body);

    assert_eq!(seen.method, "GET");
    assert_eq!(seen.header("x-trace-id"), Some("abc 123"));
    assert_eq!(seen.header("accept-language"), Some("en-GB"));
}

#[test]
fn connection_is_marked_close() {
    let addr = start_server();
    let body = send(HttpMethod::Get, &format!("http://{addr}/echo"), "", None).unwrap();
    assert_eq!(echo(body).header("connection"), Some("close"));
}

#[test]
fn caller_connection_header_is_added_not_replacing_close() {
    let addr = start_server();
    let mut headers = Headers::new();
    headers.insert("Connection".to_string(), "keep-alive".to_string());

    let body = send(HttpMethod::Get, &format!("http://{addr}/echo"), "", Some(&headers)).unwrap();
    let seen = echo(body);
    let values: Vec<&str> = seen
        .headers
        .iter()
        .filter(|(k, _)| k == "connection")
        .map(|(_, v)| v.as_str())
        .collect();
    assert!(values.contains(&"close"), "{values:?}");
    assert!(values.contains(&"keep-alive"), "{values:?}");
}

#[test]
fn body_is_sent_for_every_method_that_accepts_one() {
    let addr = start_server();
    let url = format!("http://{addr}/echo");

    for method in [HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
        let seen = echo(send(method, &url, r#"{"n":1}"#, None).unwrap());
        assert_eq!(seen.method, method.as_str());
        assert_eq!(seen.body, r#"{"n":1}"#);
    }
}

#[test]
fn head_returns_empty_body() {
    let addr = start_server();
    let body = send(HttpMethod::Head, &format!("http://{addr}/ok"), "", None).unwrap();
    assert!(body.is_empty());
}

#[test]
fn configured_user_agent_is_sent() {
    let addr = start_server();
    let sender = RequestSender::new(SenderConfig {
        user_agent: Some("reqkit-test/1.0".to_string()),
        ..SenderConfig::default()
    });

    let seen = echo(sender.send(HttpMethod::Get, &format!("http://{addr}/echo"), "", None).unwrap());
    assert!(seen
        .headers
        .iter()
        .any(|(k, v)| k == "user-agent" && v == "reqkit-test/1.0"));
}

#[test]
fn body_over_limit_is_body_error() {
    let addr = start_server();
    let sender = RequestSender::new(SenderConfig {
        max_body_bytes: Some(4),
        ..SenderConfig::default()
    });

    let err = sender
        .send(HttpMethod::Post, &format!("http://{addr}/echo"), "a long enough payload", None)
        .unwrap_err();
    assert!(matches!(err, RequestError::Body(_)), "got {err}");
}

#[test]
fn invalid_header_name_is_invalid_request() {
    let addr = start_server();
    let mut headers = Headers::new();
    headers.insert("bad header".to_string(), "v".to_string());

    let err = send(HttpMethod::Get, &format!("http://{addr}/ok"), "", Some(&headers)).unwrap_err();
    assert!(matches!(err, RequestError::InvalidRequest(_)), "got {err}");
}

#[test]
fn shared_sender_serves_concurrent_callers() {
    let addr = start_server();
    let url = format!("http://{addr}/ok");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let url = url.clone();
            std::thread::spawn(move || send(HttpMethod::Get, &url, "", None))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), b"ok");
    }
}

//! Synchronous request sender.
//!
//! # Design
//! `RequestSender` owns a `ureq::Agent` and a `SenderConfig`. One call is one
//! exchange: build the request, dispatch it, capture the response, run the
//! status policy and hand back the body. The agent keeps no idle
//! connections and every request carries `connection: close`, so the
//! transport connection ends with the exchange. Redirects are not followed.
//!
//! A process-wide sender with the default config backs the free `send`
//! function. It is created on first use and never torn down; the agent is
//! safe to share between threads.

use std::sync::LazyLock;

use tracing::{debug, warn};
use ureq::http::Response;
use ureq::typestate::WithoutBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::config::{SenderConfig, StatusPolicy};
use crate::error::RequestError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse};

static SHARED: LazyLock<RequestSender> = LazyLock::new(|| RequestSender::new(SenderConfig::default()));

/// Send one request through the shared sender and return the response body.
pub fn send(
    method: HttpMethod,
    url: &str,
    body: &str,
    headers: Option<&Headers>,
) -> Result<Vec<u8>, RequestError> {
    RequestSender::shared().send(method, url, body, headers)
}

#[derive(Clone)]
pub struct RequestSender {
    agent: Agent,
    config: SenderConfig,
}

impl RequestSender {
    pub fn new(config: SenderConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .max_idle_connections(0)
            .max_idle_connections_per_host(0)
            .build()
            .new_agent();
        Self { agent, config }
    }

    /// The process-wide sender with the default config.
    pub fn shared() -> &'static RequestSender {
        &SHARED
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    pub fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: &str,
        headers: Option<&Headers>,
    ) -> Result<Vec<u8>, RequestError> {
        self.execute(&HttpRequest::new(method, url, body, headers))
    }

    /// Run a prepared request. Construction and transport failures return
    /// immediately; a rejected status returns `RequestError::Status` with
    /// both dumps; otherwise the full body is returned.
    pub fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, RequestError> {
        let uri = request.uri()?;
        let request_dump = request.dump(&uri);

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.dispatch(request).map_err(classify)?;
        let (response, read_error) = self.receive(response);
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received response"
        );

        if let Err(err) = check_status(self.config.status_policy, &request_dump, &response) {
            warn!(url = %request.url, status = response.status, "status check failed");
            return Err(err);
        }

        match read_error {
            Some(err) => Err(err),
            None => Ok(response.body),
        }
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<Response<Body>, ureq::Error> {
        let url = request.url.as_str();
        let payload = request.body.as_bytes();
        match request.method {
            HttpMethod::Head => self.send_without_body(self.agent.head(url), request),
            HttpMethod::Get => self.send_without_body(self.agent.get(url), request),
            HttpMethod::Delete => self.send_without_body(self.agent.delete(url), request),
            HttpMethod::Post => self.decorate(self.agent.post(url), request).send(payload),
            HttpMethod::Put => self.decorate(self.agent.put(url), request).send(payload),
        }
    }

    /// GET, HEAD and DELETE carry a body only when the caller supplied one.
    fn send_without_body(
        &self,
        builder: RequestBuilder<WithoutBody>,
        request: &HttpRequest,
    ) -> Result<Response<Body>, ureq::Error> {
        let builder = self.decorate(builder, request);
        if request.body.is_empty() {
            builder.call()
        } else {
            builder.force_send_body().send(request.body.as_bytes())
        }
    }

    /// Add `connection: close`, the configured user agent and the caller's
    /// headers. Caller headers are appended, never replacing what is already
    /// set, so a caller-supplied `connection` header goes out alongside
    /// `close` rather than instead of it.
    fn decorate<B>(&self, builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        let mut builder = builder.header("connection", "close");
        if let Some(agent_name) = &self.config.user_agent {
            builder = builder.header("user-agent", agent_name.as_str());
        }
        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        builder
    }

    /// Capture status, headers and body. A body read failure is returned
    /// alongside rather than raised, so a status error can still be
    /// reported first. The body reader is dropped before returning.
    fn receive(&self, response: Response<Body>) -> (HttpResponse, Option<RequestError>) {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let mut reader = response.into_body();
        let limit = self.config.max_body_bytes.unwrap_or(u64::MAX);
        let (body, read_error) = match reader.with_config().limit(limit).read_to_vec() {
            Ok(bytes) => (bytes, None),
            Err(e) => (Vec::new(), Some(RequestError::Body(e.to_string()))),
        };

        (
            HttpResponse {
                status,
                headers,
                body,
            },
            read_error,
        )
    }
}

/// Map a status rejected by `policy` to `RequestError::Status`.
fn check_status(
    policy: StatusPolicy,
    request_dump: &str,
    response: &HttpResponse,
) -> Result<(), RequestError> {
    if policy.is_success(response.status) {
        return Ok(());
    }
    Err(RequestError::Status {
        status: response.status,
        request: request_dump.trim().to_string(),
        response: response.dump().trim().to_string(),
    })
}

fn classify(err: ureq::Error) -> RequestError {
    match err {
        e @ (ureq::Error::Http(_) | ureq::Error::BadUri(_)) => RequestError::InvalidRequest(e.to_string()),
        other => RequestError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn check_status_passes_2xx() {
        assert!(check_status(StatusPolicy::Intended, "GET / HTTP/1.1", &response(200, "ok")).is_ok());
        assert!(check_status(StatusPolicy::Literal, "GET / HTTP/1.1", &response(200, "ok")).is_ok());
    }

    #[test]
    fn check_status_error_embeds_status_and_trimmed_dumps() {
        let dump = "GET /missing HTTP/1.1\r\nHost: x\r\n\r\n";
        let err = check_status(StatusPolicy::Intended, dump, &response(404, "gone\n")).unwrap_err();
        assert_eq!(err.status(), Some(404));

        let msg = err.to_string();
        assert!(msg.starts_with("Non 200 status code: 404 REQUEST: GET /missing"));
        assert!(msg.contains("Host: x RESPONSE: HTTP/1.1 404 Not Found"));
        assert!(msg.ends_with("gone"));
    }

    #[test]
    fn check_status_300_depends_on_policy() {
        assert!(check_status(StatusPolicy::Literal, "", &response(300, "")).is_ok());
        assert!(check_status(StatusPolicy::Intended, "", &response(300, "")).is_err());
    }

    #[test]
    fn check_status_301_fails_under_both_policies() {
        assert!(check_status(StatusPolicy::Literal, "", &response(301, "")).is_err());
        assert!(check_status(StatusPolicy::Intended, "", &response(301, "")).is_err());
    }

    #[test]
    fn malformed_url_is_invalid_request() {
        let err = send(HttpMethod::Get, "::not a url::", "", None).unwrap_err();
        assert!(matches!(err, RequestError::InvalidRequest(_)));
    }

    #[test]
    fn relative_url_is_invalid_request() {
        let err = send(HttpMethod::Get, "/items", "", None).unwrap_err();
        assert!(matches!(err, RequestError::InvalidRequest(_)));
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = send(HttpMethod::Get, &format!("http://{addr}/ok"), "", None).unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)), "got {err}");
    }

    #[test]
    fn shared_sender_uses_default_config() {
        assert_eq!(RequestSender::shared().config(), &SenderConfig::default());
    }
}

//! HTTP data types for a single request/response exchange.
//!
//! # Design
//! Requests and responses are plain owned data. `HttpRequest` is built per
//! call and never outlives it; `HttpResponse` is what the sender captured
//! from the wire. Both can render a textual dump that only ever ends up in
//! error messages.
//!
//! `HttpMethod` carries explicit discriminants so the numeric codes used at
//! the C boundary stay stable.

use std::collections::HashMap;
use std::fmt;

use ureq::http::{StatusCode, Uri};

use crate::error::RequestError;

/// Extra headers for an outgoing request, keyed by header name.
pub type Headers = HashMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HttpMethod {
    Head = 0,
    Get = 1,
    Post = 2,
    Put = 3,
    Delete = 4,
}

impl HttpMethod {
    /// Canonical uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Head => "HEAD",
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Numeric code of this method.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for HttpMethod {
    type Error = RequestError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(HttpMethod::Head),
            1 => Ok(HttpMethod::Get),
            2 => Ok(HttpMethod::Post),
            3 => Ok(HttpMethod::Put),
            4 => Ok(HttpMethod::Delete),
            other => Err(RequestError::UnknownMethod(other)),
        }
    }
}

/// Render a raw method code, falling back to `Unknown(<code>)` for values
/// outside the known set.
pub fn method_name(code: u8) -> String {
    match HttpMethod::try_from(code) {
        Ok(method) => method.as_str().to_string(),
        Err(_) => format!("Unknown({code})"),
    }
}

/// An outgoing HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Option<Headers>,
    pub body: String,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: &str, body: &str, headers: Option<&Headers>) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: headers.cloned(),
            body: body.to_string(),
        }
    }

    /// Parse `url` into a `Uri` that carries both a scheme and a host.
    pub fn uri(&self) -> Result<Uri, RequestError> {
        let uri: Uri = self
            .url
            .parse()
            .map_err(|e| RequestError::InvalidRequest(format!("{}: {e}", self.url)))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(RequestError::InvalidRequest(format!(
                "{}: missing scheme or host",
                self.url
            )));
        }
        Ok(uri)
    }

    /// Textual rendering of the request as it goes out: request line,
    /// headers (sorted by name), blank line, body. `uri` is this request's
    /// parsed `url`, as returned by `uri()`.
    pub fn dump(&self, uri: &Uri) -> String {
        let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
        let host = uri.authority().map_or("", |a| a.as_str());

        let mut out = format!("{} {target} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n", self.method);
        if let Some(headers) = &self.headers {
            let mut sorted: Vec<_> = headers.iter().collect();
            sorted.sort();
            for (name, value) in sorted {
                out.push_str(&format!("{name}: {value}\r\n"));
            }
        }
        if !self.body.is_empty() {
            out.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        out
    }
}

/// An HTTP response captured after dispatch.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Textual rendering of the response: status line, headers, blank line,
    /// body (lossy UTF-8).
    pub fn dump(&self) -> String {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        let mut out = format!("HTTP/1.1 {} {reason}\r\n", self.status);
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(&String::from_utf8_lossy(&self.body));
        out
    }
}

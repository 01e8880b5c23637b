//! Blocking HTTP request helper and URL utilities.
//!
//! # Overview
//! `send` issues one HTTP request with a chosen method, body and headers and
//! returns the response body bytes. Anything that goes wrong, from a
//! malformed URL to a rejected status, comes back as a `RequestError` with a
//! readable message; rejected statuses embed dumps of both the request and
//! the response.
//!
//! # Design
//! - `RequestSender` wraps a `ureq::Agent`; a shared default sender backs
//!   the free `send` function.
//! - Success is decided by `StatusPolicy`, the one place the status rule
//!   lives.
//! - Connections are never reused and redirects are never followed.
//! - `join_url`, `base_url` and `parse_url` are plain string helpers.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod urls;

pub use client::{send, RequestSender};
pub use config::{SenderConfig, StatusPolicy};
pub use error::RequestError;
pub use http::{method_name, Headers, HttpMethod, HttpRequest, HttpResponse};
pub use urls::{base_url, join_url, parse_url};

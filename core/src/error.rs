//! Error type for request sending and URL helpers.
//!
//! # Design
//! Every failure is a single `RequestError` carrying a human-readable
//! message. Variants exist so the C boundary can report an error code; plain
//! Rust callers usually only look at `Display`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    /// The request could not be constructed, typically a malformed URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connecting, sending or receiving headers failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status the active policy rejects.
    /// `request` and `response` are the trimmed diagnostic dumps.
    #[error("Non 200 status code: {status} REQUEST: {request} RESPONSE: {response}")]
    Status {
        status: u16,
        request: String,
        response: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("Unknown({0})")]
    UnknownMethod(u8),
}

impl RequestError {
    /// Status code for `Status` errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

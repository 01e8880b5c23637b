//! Sender configuration and the status policy.
//!
//! # Design
//! Whether a status counts as success is decided in exactly one place,
//! `StatusPolicy::is_success`. `Literal` keeps the historical comparison
//! `status >= 200 && status > 300` as the failure test, which lets every
//! status in 200..=300 (and below 200) through and rejects 301 and up.
//! `Intended` is the plain 2xx check and is the default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Fail when `status >= 200 && status > 300`.
    Literal,
    /// Succeed only when `200 <= status < 300`.
    #[default]
    Intended,
}

impl StatusPolicy {
    pub fn is_success(self, status: u16) -> bool {
        match self {
            StatusPolicy::Literal => !(status >= 200 && status > 300),
            StatusPolicy::Intended => (200..300).contains(&status),
        }
    }
}

/// Settings for a `RequestSender`. Every field has a default, so an empty
/// JSON object is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub status_policy: StatusPolicy,
    /// Sent as `user-agent` when set; otherwise the agent's own value is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Cap on the response body size. `None` reads the whole body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<u64>,
}

impl SenderConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }
}

//! Exchange failure taxonomy

use serde::Serialize;
use thiserror::Error;

/// Why an exchange with the backend did not produce a reply.
///
/// The `Display` text is what the user sees: a category prefix followed by
/// the underlying detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Backend answered with a non-2xx status
    #[error("Backend error {status}: {body}")]
    Http { status: u16, body: String },

    /// Backend answered 2xx with an explicit `error` field
    #[error("Error: {0}")]
    Application(String),

    /// Backend answered 2xx with neither a reply nor an error
    #[error("Empty response from backend")]
    EmptyResponse,

    /// The request could not complete: network, timeout, or unparseable body
    #[error("Network error: {0}")]
    Transport(String),
}

/// Coarse failure class, used to pick the terminal outcome and notice style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Application,
    Transport,
}

impl ExchangeError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { .. } | Self::Application(_) | Self::EmptyResponse => {
                ErrorCategory::Application
            }
            Self::Transport(_) => ErrorCategory::Transport,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::transport(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::transport(format!("connection failed: {e}"))
        } else if e.is_decode() {
            Self::transport(format!("malformed response: {e}"))
        } else {
            Self::transport(format!("request failed: {e}"))
        }
    }
}

//! Chat backend abstraction
//!
//! The client talks to a single HTTP/JSON backend that owns the model
//! credentials. Everything above this module sees the [`ChatBackend`] trait.

mod error;
mod http;
mod types;

pub use error::{ErrorCategory, ExchangeError};
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for chat backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the full conversation and return the trimmed reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String, ExchangeError>;

    /// Ask for a single piece of code
    async fn generate_code(&self, request: &CodeGenRequest) -> Result<CodeGenReply, ExchangeError>;

    async fn health(&self) -> Result<BackendHealth, ExchangeError>;

    /// Where requests go, for logs
    fn endpoint(&self) -> &str;
}

/// Logging wrapper for chat backends
pub struct LoggingBackend {
    inner: Arc<dyn ChatBackend>,
    endpoint: String,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn ChatBackend>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl ChatBackend for LoggingBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ExchangeError> {
        let start = Instant::now();
        let result = self.inner.chat(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    turns = request.messages.len(),
                    reply_chars = reply.chars().count(),
                    "Chat exchange completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    turns = request.messages.len(),
                    category = ?e.category(),
                    error = %e,
                    "Chat exchange failed"
                );
            }
        }

        result
    }

    async fn generate_code(&self, request: &CodeGenRequest) -> Result<CodeGenReply, ExchangeError> {
        let start = Instant::now();
        let result = self.inner.generate_code(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    language = %request.language,
                    model = reply
                        .metadata
                        .as_ref()
                        .and_then(|m| m.model.as_deref())
                        .unwrap_or("unknown"),
                    "Code generation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    language = %request.language,
                    error = %e,
                    "Code generation failed"
                );
            }
        }

        result
    }

    async fn health(&self) -> Result<BackendHealth, ExchangeError> {
        let result = self.inner.health().await;
        if let Err(e) = &result {
            tracing::warn!(endpoint = %self.endpoint, error = %e, "Health check failed");
        }
        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

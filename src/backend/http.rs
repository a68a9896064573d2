//! HTTP implementation of the chat backend contract

use super::types::{
    BackendHealth, ChatRequest, ChatResponse, CodeGenReply, CodeGenRequest, CodeGenResponse,
};
use super::{ChatBackend, ExchangeError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const CHAT_PATH: &str = "/api/chat";
const GENERATE_CODE_PATH: &str = "/api/generate_code";
const HEALTH_PATH: &str = "/api/health";

/// Talks to the backend over HTTP/JSON
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body and return the raw status and body text.
    /// Only failures to complete the request are errors here.
    async fn post_json<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(u16, String), ExchangeError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ExchangeError::transport(format!("failed to read response: {e}")))?;
        Ok((status, text))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ExchangeError> {
        let (status, body) = self.post_json(CHAT_PATH, request).await?;
        interpret_chat(status, &body)
    }

    async fn generate_code(&self, request: &CodeGenRequest) -> Result<CodeGenReply, ExchangeError> {
        let (status, body) = self.post_json(GENERATE_CODE_PATH, request).await?;
        interpret_codegen(status, &body)
    }

    async fn health(&self) -> Result<BackendHealth, ExchangeError> {
        let response = self.client.get(self.url(HEALTH_PATH)).send().await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::transport(format!("failed to read response: {e}")))?;
        if !is_success(status) {
            return Err(ExchangeError::Http { status, body });
        }
        serde_json::from_str(&body)
            .map_err(|e| ExchangeError::transport(format!("malformed response: {e}")))
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Parse a 2xx body. Only a body that is not JSON at all is a transport
/// failure; any JSON of the wrong shape parses as an empty payload.
fn parse_payload<T: DeserializeOwned + Default>(body: &str) -> Result<T, ExchangeError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ExchangeError::transport(format!("malformed response: {e}")))?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn explicit_error(error: Option<String>) -> Option<ExchangeError> {
    error
        .filter(|e| !e.trim().is_empty())
        .map(ExchangeError::Application)
}

/// Map a raw `/api/chat` response onto the reply or one failure class
pub(crate) fn interpret_chat(status: u16, body: &str) -> Result<String, ExchangeError> {
    if !is_success(status) {
        return Err(ExchangeError::Http {
            status,
            body: body.to_string(),
        });
    }

    let response: ChatResponse = parse_payload(body)?;
    if let Some(error) = explicit_error(response.error) {
        return Err(error);
    }
    response
        .reply
        .map(|reply| reply.trim().to_string())
        .filter(|reply| !reply.is_empty())
        .ok_or(ExchangeError::EmptyResponse)
}

/// Map a raw `/api/generate_code` response onto the code or a failure class
pub(crate) fn interpret_codegen(status: u16, body: &str) -> Result<CodeGenReply, ExchangeError> {
    if !is_success(status) {
        return Err(ExchangeError::Http {
            status,
            body: body.to_string(),
        });
    }

    let response: CodeGenResponse = parse_payload(body)?;
    if let Some(error) = explicit_error(response.error) {
        return Err(error);
    }
    let code = response
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or(ExchangeError::EmptyResponse)?;
    Ok(CodeGenReply {
        code,
        metadata: response.metadata,
    })
}

//! Wire types for the chat backend

use crate::session::Turn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Turn>,
}

/// Body returned by `/api/chat`; at most one field is normally set.
/// Fields that are not strings are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "string_or_none")]
    pub reply: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/generate_code`
#[derive(Debug, Clone, Serialize)]
pub struct CodeGenRequest {
    pub prompt: String,
    pub language: String,
    pub temperature: f32,
}

/// Every field is optional; a partial report still carries what it has
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeGenMetadata {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, rename = "latencyMs")]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Body returned by `/api/generate_code`
#[derive(Debug, Default, Deserialize)]
pub struct CodeGenResponse {
    #[serde(default, deserialize_with = "string_or_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "metadata_or_none")]
    pub metadata: Option<CodeGenMetadata>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub error: Option<String>,
}

/// Successful code generation
#[derive(Debug, Clone, PartialEq)]
pub struct CodeGenReply {
    pub code: String,
    pub metadata: Option<CodeGenMetadata>,
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

/// Metadata is informational; a malformed block must not cost the code
fn metadata_or_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CodeGenMetadata>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Body returned by `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_configured: bool,
}

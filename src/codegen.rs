//! One-shot code generation
//!
//! Separate from the chat exchange: a single prompt goes to the backend's
//! code endpoint and comes back as one code artifact, which the session
//! keeps as its last generated code.

pub mod export;

use crate::backend::{ChatBackend, CodeGenRequest, ExchangeError};
use crate::render::{detect_language, extension_for, extract_code_block};
use serde::Serialize;
use thiserror::Error;

/// Low temperature keeps generated code close to deterministic
pub const CODEGEN_TEMPERATURE: f32 = 0.2;

/// A generated code artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedCode {
    pub code: String,
    pub language: String,
    pub extension: String,
    pub model: Option<String>,
    pub latency_ms: Option<u64>,
    pub temperature: f32,
}

impl GeneratedCode {
    pub fn suggested_filename(&self) -> String {
        format!("generated_code.{}", self.extension)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CodegenError {
    #[error("Describe the code you want, e.g. /code reverse a string in rust")]
    EmptyPrompt,
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

/// Generate code for `prompt`.
///
/// The target language is inferred from the prompt; the backend's own
/// report of the language wins when present. Fences are stripped if the
/// model wrapped its answer in them anyway.
pub async fn generate_code(
    backend: &dyn ChatBackend,
    prompt: &str,
    temperature: f32,
) -> Result<GeneratedCode, CodegenError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(CodegenError::EmptyPrompt);
    }

    let requested = detect_language(prompt);
    let request = CodeGenRequest {
        prompt: prompt.to_string(),
        language: requested.to_string(),
        temperature,
    };
    tracing::debug!(language = requested, "Requesting code generation");

    let reply = backend.generate_code(&request).await?;

    let metadata = reply.metadata.unwrap_or_default();
    let language = metadata
        .language
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| requested.to_string());
    let code = extract_code_block(&reply.code, &language)
        .unwrap_or_else(|| reply.code.trim().to_string());

    Ok(GeneratedCode {
        extension: extension_for(&language).to_string(),
        model: metadata.model,
        latency_ms: metadata.latency_ms,
        temperature: metadata.temperature.unwrap_or(temperature),
        code,
        language,
    })
}

//! Client configuration from the environment

use crate::codegen::CODEGEN_TEMPERATURE;
use crate::system_prompt::build_system_prompt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub timeout: Duration,
    pub system_prompt: String,
    /// Where /save and /export write files
    pub export_dir: PathBuf,
    pub codegen_temperature: f32,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Invalid values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend_url = lookup("CODECHAT_BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let timeout_secs = parse_or_default(
            "CODECHAT_TIMEOUT_SECS",
            lookup("CODECHAT_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        );
        let timeout_secs = if timeout_secs == 0 {
            tracing::warn!("CODECHAT_TIMEOUT_SECS must be positive, using default");
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };

        let codegen_temperature: f32 = parse_or_default(
            "CODECHAT_CODEGEN_TEMPERATURE",
            lookup("CODECHAT_CODEGEN_TEMPERATURE"),
            CODEGEN_TEMPERATURE,
        );
        let codegen_temperature = if codegen_temperature.is_finite() {
            codegen_temperature.clamp(0.0, 1.0)
        } else {
            CODEGEN_TEMPERATURE
        };

        Self {
            backend_url,
            timeout: Duration::from_secs(timeout_secs),
            system_prompt: build_system_prompt(lookup("CODECHAT_SYSTEM_PROMPT").as_deref()),
            export_dir: lookup("CODECHAT_EXPORT_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
            codegen_temperature,
        }
    }
}

fn parse_or_default<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
    }
}

use std::time::Duration;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const MAX_TOKENS: u32 = 2048;
pub const TEMPERATURE: f32 = 0.7;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Relay settings read from the process environment.
///
/// The API key is optional here: a missing key is reported per request as a
/// configuration error instead of preventing the server from starting.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub port: u16,
    pub upstream_timeout: Duration,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty());

        let base_url = std::env::var("GROQ_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key,
            base_url,
            model,
            port,
            upstream_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Configuration pointing at an arbitrary upstream, used by tests.
    #[cfg(test)]
    pub fn for_upstream(
        base_url: impl Into<String>,
        api_key: Option<&str>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            api_key: api_key.map(str::to_string),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            port: 0,
            upstream_timeout,
        }
    }
}

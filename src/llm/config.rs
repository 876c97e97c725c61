//! LLM configuration from environment variables

use super::backend::{LlmBackend, BACKEND_ENV};
use crate::error::CapabilityError;

pub const TIMEOUT_ENV: &str = "LLM_TIMEOUT_SECS";
pub const TEMPERATURE_ENV: &str = "LLM_TEMPERATURE";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: u64,
    /// Override the provider endpoint (proxies, OpenAI-compatible servers)
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// Config with the backend's default model and the standard knobs
    pub fn new(backend: LlmBackend, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            model: backend.default_model().to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            base_url: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read `LLM_BACKEND`, the provider's key/model vars, `LLM_TIMEOUT_SECS`
    /// and `LLM_TEMPERATURE`
    pub fn from_env() -> Result<Self, CapabilityError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CapabilityError> {
        let backend = match non_empty(lookup(BACKEND_ENV)) {
            Some(value) => value
                .parse::<LlmBackend>()
                .map_err(|e| CapabilityError::Config(e.to_string()))?,
            None => LlmBackend::default(),
        };

        let api_key = non_empty(lookup(backend.api_key_env()))
            .ok_or(CapabilityError::MissingApiKey(backend.api_key_env()))?;

        let mut config = Self::new(backend, api_key);

        if let Some(model) = non_empty(lookup(backend.model_env())) {
            config.model = model;
        }
        if let Some(raw) = non_empty(lookup(TIMEOUT_ENV)) {
            config.timeout_seconds = raw
                .trim()
                .parse()
                .map_err(|_| invalid_number(TIMEOUT_ENV, &raw))?;
        }
        if let Some(raw) = non_empty(lookup(TEMPERATURE_ENV)) {
            let temperature: f32 = raw
                .trim()
                .parse()
                .map_err(|_| invalid_number(TEMPERATURE_ENV, &raw))?;
            config.temperature = Some(temperature);
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn invalid_number(name: &str, raw: &str) -> CapabilityError {
    CapabilityError::Config(format!("{} must be a number, got '{}'", name, raw))
}

//! Backend Selection
//!
//! Enum for selecting between LLM providers (Gemini, OpenAI).

use std::str::FromStr;

/// Env var selecting the provider. Valid values: "gemini", "google", "openai", "gpt"
pub const BACKEND_ENV: &str = "LLM_BACKEND";

/// LLM backend provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    /// Google Gemini (default)
    #[default]
    Gemini,
    /// OpenAI GPT
    OpenAi,
}

impl LlmBackend {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "Gemini",
            LlmBackend::OpenAi => "OpenAI",
        }
    }

    /// Env var holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "GEMINI_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Env var overriding this provider's model
    pub fn model_env(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "GEMINI_MODEL",
            LlmBackend::OpenAi => "OPENAI_MODEL",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "gemini-2.5-flash-lite",
            LlmBackend::OpenAi => "gpt-4o",
        }
    }
}

/// Error type for parsing LlmBackend
#[derive(Debug)]
pub struct ParseBackendError(String);

impl std::fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for LlmBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmBackend::Gemini),
            "openai" | "gpt" => Ok(LlmBackend::OpenAi),
            other => Err(ParseBackendError(format!(
                "Unknown LLM_BACKEND '{}'. Valid values: gemini, google, openai, gpt",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

//! Client Factory
//!
//! Builds the configured LLM client once; routers share it as
//! `Arc<dyn LlmClient>`.

use std::sync::Arc;

use tracing::info;

use super::backend::LlmBackend;
use super::config::LlmConfig;
use super::gemini_client::GeminiClient;
use super::llm_client::LlmClient;
use super::openai_client::OpenAiClient;
use crate::error::CapabilityError;

/// Create an LLM client from environment configuration
///
/// Uses `LLM_BACKEND` to pick the provider (default: Gemini)
pub fn create_llm_client() -> Result<Arc<dyn LlmClient>, CapabilityError> {
    create_llm_client_with_config(LlmConfig::from_env()?)
}

/// Create an LLM client from an explicit config
pub fn create_llm_client_with_config(config: LlmConfig) -> Result<Arc<dyn LlmClient>, CapabilityError> {
    info!("Using {} backend ({})", config.backend, config.model);
    let client: Arc<dyn LlmClient> = match config.backend {
        LlmBackend::Gemini => Arc::new(GeminiClient::new(config)?),
        LlmBackend::OpenAi => Arc::new(OpenAiClient::new(config)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_picks_backend() {
        let client = create_llm_client_with_config(LlmConfig::new(LlmBackend::OpenAi, "k")).unwrap();
        assert_eq!(client.provider_name(), "OpenAI");

        let client = create_llm_client_with_config(
            LlmConfig::new(LlmBackend::Gemini, "k").with_model("gemini-2.0-flash"),
        )
        .unwrap();
        assert_eq!(client.provider_name(), "Gemini");
        assert_eq!(client.model_name(), "gemini-2.0-flash");
    }
}

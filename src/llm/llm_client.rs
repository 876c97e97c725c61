//! LLM Client Trait
//!
//! Unified interface for LLM providers (Gemini, OpenAI). The routers only
//! ever see `Arc<dyn LlmClient>`, built once at startup.

use async_trait::async_trait;

use crate::error::CapabilityError;

/// Unified LLM client interface
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM with system + user prompts, return raw text response
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CapabilityError>;

    /// Call the LLM expecting JSON response
    /// - For Gemini: sets `responseMimeType: application/json`
    /// - For OpenAI: uses response_format json_object mode
    ///
    /// The text may still be fenced or wrapped in prose; run it through
    /// [`parse_json_object`](crate::response_parser::parse_json_object).
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, CapabilityError>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}

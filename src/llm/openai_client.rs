//! OpenAI Client
//!
//! LLM client implementation for the OpenAI chat completions API (and
//! compatible servers via `base_url`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use super::config::LlmConfig;
use super::llm_client::LlmClient;
use crate::error::CapabilityError;

const PROVIDER: &str = "OpenAI";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: LlmConfig,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, CapabilityError> {
        if config.api_key.is_empty() {
            return Err(CapabilityError::MissingApiKey("OPENAI_API_KEY"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    fn build_body(&self, system_prompt: &str, user_prompt: &str, json_mode: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": &self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ]
        });

        if let Some(temperature) = self.config.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        body
    }

    /// Internal API call implementation
    async fn call_api(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, CapabilityError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("Sending request to OpenAI API: {} ({})", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_body(system_prompt, user_prompt, json_mode))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("OpenAI API error: {} - {}", status, text);
            return Err(CapabilityError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }

        let api_response: ApiResponse =
            serde_json::from_str(&text).map_err(|source| CapabilityError::Decode {
                provider: PROVIDER,
                source,
            })?;
        first_content(api_response)
    }
}

fn first_content(response: ApiResponse) -> Result<String, CapabilityError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(CapabilityError::EmptyResponse(PROVIDER))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CapabilityError> {
        self.call_api(system_prompt, user_prompt, false).await
    }

    async fn chat_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CapabilityError> {
        self.call_api(system_prompt, user_prompt, true).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

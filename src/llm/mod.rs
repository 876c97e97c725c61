//! Language-model capability
//!
//! - `llm_client` - the `LlmClient` trait the routers depend on
//! - `backend` / `config` - provider selection and env configuration
//! - `gemini_client` / `openai_client` - HTTP implementations
//! - `client_factory` - builds the configured client

pub mod backend;
pub mod client_factory;
pub mod config;
pub mod gemini_client;
pub mod llm_client;
pub mod openai_client;

pub use backend::LlmBackend;
pub use client_factory::{create_llm_client, create_llm_client_with_config};
pub use config::LlmConfig;
pub use gemini_client::GeminiClient;
pub use llm_client::LlmClient;
pub use openai_client::OpenAiClient;

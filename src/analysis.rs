//! Language-model analysis shared by the movie and music routers

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::llm::LlmClient;
use crate::response_parser::{parse_json_object, JsonExtraction};

/// Ask the model to classify `user_text` and decode its JSON answer into `T`.
///
/// `user_text` is the caller's original text, not the normalized form.
pub(crate) async fn analyze<T: DeserializeOwned>(
    llm: &dyn LlmClient,
    system_prompt: &str,
    user_text: &str,
    extraction: JsonExtraction,
) -> Result<T, AnalysisError> {
    debug!(
        "Calling {} ({}) for intent analysis",
        llm.provider_name(),
        llm.model_name()
    );

    let user_prompt = format!("사용자 입력: {}", user_text);
    let raw = llm.chat_json(system_prompt, &user_prompt).await?;
    debug!("LLM raw response:\n{}", raw);

    let object = parse_json_object(&raw, extraction)?;
    serde_json::from_value(Value::Object(object)).map_err(|source| {
        warn!("LLM JSON did not match analysis shape: {}\n{}", source, raw);
        AnalysisError::Schema { raw, source }
    })
}

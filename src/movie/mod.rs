//! Movie request routing
//!
//! [`MovieRouter::route`] runs the rule cascade first and only calls the
//! language model when no rule matched. The model's answer is mapped back
//! onto the same [`Classification`] so both paths share one composer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::analyze;
use crate::composer::IntentComposer;
use crate::extractors::{classify_movie, Classification};
use crate::llm::LlmClient;
use crate::normalize::normalize_text;
use crate::random::RandomSource;
use crate::response_parser::JsonExtraction;
use crate::routing::{FallbackReason, RoutingResult};
use crate::rules::RuleBook;

const SYSTEM_PROMPT: &str = include_str!("prompts/intent_analysis.md");

/// Situation value that maps to the short-session intent
const CHARGING_SITUATION: &str = "charging";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovieIntent {
    SimilarByTitle,
    Weather,
    Mood,
    RechargeImmersiveContinue,
    LlmFallback,
}

/// What the language model extracted from a movie request.
///
/// Every field is optional; a missing key and `null` mean the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieAnalysis {
    #[serde(default)]
    pub is_movie_related: Option<bool>,
    #[serde(default)]
    pub reference_title: Option<String>,
    /// charging | commute | home | travel
    #[serde(default)]
    pub situation: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
}

impl MovieAnalysis {
    pub fn is_related(&self) -> bool {
        self.is_movie_related == Some(true)
    }

    /// Map the populated fields onto a classification, checking
    /// reference title, charging situation, weather, then mood.
    ///
    /// The title is kept exactly as the model wrote it; category values are
    /// normalized before lookup.
    pub fn classification(&self) -> Option<Classification> {
        if let Some(title) = self
            .reference_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
        {
            return Some(Classification::SimilarTitle(title.to_string()));
        }

        if category(&self.situation).as_deref() == Some(CHARGING_SITUATION) {
            return Some(Classification::Situational);
        }

        if let Some(weather) = category(&self.weather) {
            return Some(Classification::Weather(weather));
        }

        category(&self.mood).map(Classification::Mood)
    }
}

fn category(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(normalize_text)
        .filter(|v| !v.is_empty())
}

/// Routes free-text movie requests
pub struct MovieRouter {
    rules: Arc<RuleBook>,
    composer: IntentComposer,
    llm: Arc<dyn LlmClient>,
    extraction: JsonExtraction,
}

impl MovieRouter {
    pub fn new(rules: Arc<RuleBook>, llm: Arc<dyn LlmClient>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            composer: IntentComposer::new(rules.clone(), random),
            rules,
            llm,
            extraction: JsonExtraction::default(),
        }
    }

    pub fn with_json_extraction(mut self, extraction: JsonExtraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// Classify one request. Never fails; problems on the language-model
    /// path end in an `LLM_FALLBACK` result carrying the original text.
    pub async fn route(&self, user_text: &str) -> RoutingResult<MovieIntent> {
        info!("Movie routing request: {}", user_text);

        let normalized = normalize_text(user_text);
        if normalized.is_empty() {
            return self.fallback(user_text, FallbackReason::EmptyInput);
        }

        if let Some((extractor, classification)) = classify_movie(&self.rules, &normalized) {
            debug!("Rule hit ({}): {:?}", extractor, classification);
            return self.composer.compose_movie(classification);
        }

        debug!("No rule matched, falling back to language model");
        let analysis: MovieAnalysis =
            match analyze(self.llm.as_ref(), SYSTEM_PROMPT, user_text, self.extraction).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!("Movie intent analysis failed: {}", e);
                    return self.fallback(user_text, FallbackReason::from(&e));
                }
            };
        debug!("LLM analysis: {:?}", analysis);

        if !analysis.is_related() {
            return self.fallback(user_text, FallbackReason::NotDomainRelated);
        }

        match analysis.classification() {
            Some(classification) => self.composer.compose_movie(classification),
            None => self.fallback(user_text, FallbackReason::NoUsableFields),
        }
    }

    fn fallback(&self, user_text: &str, reason: FallbackReason) -> RoutingResult<MovieIntent> {
        info!("Movie request falls back to language model: {}", reason);
        self.composer.fallback(MovieIntent::LlmFallback, user_text, reason)
    }
}

impl std::fmt::Debug for MovieRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieRouter")
            .field("rules", &self.rules.version())
            .field("llm", &self.llm.model_name())
            .field("extraction", &self.extraction)
            .finish_non_exhaustive()
    }
}

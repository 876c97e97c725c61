//! Music request routing
//!
//! There are no rule extractors for music: every non-empty request goes to
//! the language model, and its answer is cleaned against the vocabulary in
//! the rule book before it reaches the payload.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::analyze;
use crate::composer::IntentComposer;
use crate::llm::LlmClient;
use crate::normalize::normalize_text;
use crate::random::RandomSource;
use crate::response_parser::JsonExtraction;
use crate::routing::{FallbackReason, RoutingResult};
use crate::rules::{MusicVocabulary, RuleBook};

const SYSTEM_PROMPT: &str = include_str!("prompts/intent_analysis.md");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MusicIntent {
    General,
    Artist,
    Similar,
    Unrelated,
}

/// The `intent_type` carried in a music payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicIntentType {
    #[default]
    General,
    /// Songs by a named artist; requires `artist`
    Artist,
    /// Songs like a given track; requires `seed_track`
    Similar,
}

impl MusicIntentType {
    /// Lenient parse of the model's value; anything unknown is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match normalize_text(value).as_str() {
            "general" => Some(MusicIntentType::General),
            "artist" => Some(MusicIntentType::Artist),
            "similar" => Some(MusicIntentType::Similar),
            _ => None,
        }
    }
}

impl From<MusicIntentType> for MusicIntent {
    fn from(intent_type: MusicIntentType) -> Self {
        match intent_type {
            MusicIntentType::General => MusicIntent::General,
            MusicIntentType::Artist => MusicIntent::Artist,
            MusicIntentType::Similar => MusicIntent::Similar,
        }
    }
}

/// What the language model extracted from a music request.
///
/// `intent_type` stays a string here so an unexpected value degrades to
/// `general` instead of failing the whole analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicAnalysis {
    #[serde(default)]
    pub is_music_related: Option<bool>,
    #[serde(default)]
    pub intent_type: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub seed_track: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
}

/// A music analysis after vocabulary checks and intent downgrades
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMusic {
    pub intent_type: MusicIntentType,
    pub artist: Option<String>,
    pub seed_track: Option<String>,
    pub context: Option<String>,
    pub mood: Option<String>,
    pub weather: Option<String>,
}

impl MusicAnalysis {
    pub fn is_related(&self) -> bool {
        self.is_music_related == Some(true)
    }

    /// Settle the intent type and drop out-of-vocabulary categories.
    ///
    /// `artist` without an artist name, or `similar` without a seed track,
    /// becomes `general`.
    pub fn resolve(&self, vocabulary: &MusicVocabulary) -> ResolvedMusic {
        let artist = free_text(&self.artist);
        let seed_track = free_text(&self.seed_track);

        let requested = self
            .intent_type
            .as_deref()
            .and_then(MusicIntentType::parse)
            .unwrap_or_default();

        let intent_type = match requested {
            MusicIntentType::Artist if artist.is_none() => {
                debug!("intent_type artist without artist, downgrading to general");
                MusicIntentType::General
            }
            MusicIntentType::Similar if seed_track.is_none() => {
                debug!("intent_type similar without seed_track, downgrading to general");
                MusicIntentType::General
            }
            other => other,
        };

        ResolvedMusic {
            intent_type,
            artist,
            seed_track,
            context: in_vocabulary("context", &self.context, &vocabulary.contexts),
            mood: in_vocabulary("mood", &self.mood, &vocabulary.moods),
            weather: in_vocabulary("weather", &self.weather, &vocabulary.weathers),
        }
    }
}

fn free_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn in_vocabulary(field: &str, value: &Option<String>, allowed: &[String]) -> Option<String> {
    let normalized = normalize_text(value.as_deref()?);
    if normalized.is_empty() {
        return None;
    }
    if allowed.contains(&normalized) {
        Some(normalized)
    } else {
        debug!("Dropping {} '{}': not in vocabulary", field, normalized);
        None
    }
}

/// Routes free-text music requests
pub struct MusicRouter {
    composer: IntentComposer,
    llm: Arc<dyn LlmClient>,
    extraction: JsonExtraction,
}

impl MusicRouter {
    pub fn new(rules: Arc<RuleBook>, llm: Arc<dyn LlmClient>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            composer: IntentComposer::new(rules, random),
            llm,
            extraction: JsonExtraction::default(),
        }
    }

    pub fn with_json_extraction(mut self, extraction: JsonExtraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// Classify one request. Never fails; anything that isn't a usable
    /// music analysis ends in an `UNRELATED` result.
    pub async fn route(&self, user_text: &str) -> RoutingResult<MusicIntent> {
        info!("Music routing request: {}", user_text);

        if normalize_text(user_text).is_empty() {
            return self.unrelated(user_text, FallbackReason::EmptyInput);
        }

        let analysis: MusicAnalysis =
            match analyze(self.llm.as_ref(), SYSTEM_PROMPT, user_text, self.extraction).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!("Music intent analysis failed: {}", e);
                    return self.unrelated(user_text, FallbackReason::from(&e));
                }
            };
        debug!("LLM analysis: {:?}", analysis);

        if !analysis.is_related() {
            return self.unrelated(user_text, FallbackReason::NotDomainRelated);
        }

        self.composer.compose_music(&analysis)
    }

    fn unrelated(&self, user_text: &str, reason: FallbackReason) -> RoutingResult<MusicIntent> {
        info!("Music request falls back to language model: {}", reason);
        self.composer.fallback(MusicIntent::Unrelated, user_text, reason)
    }
}

impl std::fmt::Debug for MusicRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicRouter")
            .field("composer", &self.composer)
            .field("llm", &self.llm.model_name())
            .field("extraction", &self.extraction)
            .finish()
    }
}

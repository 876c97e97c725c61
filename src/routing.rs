//! Routing result types
//!
//! [`RoutingResult`] is the only thing callers see. Payload key names match
//! what the recommendation backend adapter already consumes
//! (`seedTitle`, `prefer_genres`, `min_vote`, ...), so they are spelled out
//! with `serde(rename)` rather than derived from field names.

use serde::{Deserialize, Serialize};

/// Which downstream system should receive the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// Query the recommendation/search backend (TMDB, music catalogue)
    RecommendationBackend,
    /// Hand the raw request to the language model to answer directly
    LanguageModelDirect,
}

/// Output of one routing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingResult<I> {
    pub intent: I,
    pub route: Route,
    pub payload: Payload,
}

/// Parameters handed to the downstream system
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    SimilarTitle(SimilarTitlePayload),
    Situational(SituationalPayload),
    Discover(DiscoverPayload),
    Music(MusicPayload),
    Fallback(FallbackPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarTitlePayload {
    #[serde(rename = "seedTitle")]
    pub seed_title: String,
}

/// Safe, widely liked picks for short interrupted sessions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SituationalPayload {
    pub fast_start: bool,
    pub mobile_friendly: bool,
    pub low_cognitive_load: bool,
    pub likely_to_continue: bool,
    pub min_vote: f64,
    pub sort_by: SortOrder,
    pub page: u32,
}

/// Genre-driven discovery for weather and mood intents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoverPayload {
    #[serde(flatten)]
    pub signal: Signal,
    pub prefer_genres: Vec<String>,
    pub min_vote: f64,
    pub sort_by: SortOrder,
    pub page: u32,
}

/// The category that selected the genres; serializes as `"weather": key` or `"mood": key`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Weather(String),
    Mood(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MusicPayload {
    /// Always `true`: unrelated requests never get a music payload
    pub is_music_related: bool,
    pub intent_type: crate::music::MusicIntentType,
    pub artist: Option<String>,
    pub seed_track: Option<String>,
    pub context: Option<String>,
    pub mood: Option<String>,
    pub weather: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackPayload {
    #[serde(rename = "userText")]
    pub user_text: String,
    pub reason: FallbackReason,
}

/// TMDB discover sort orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_count.desc")]
    VoteCountDesc,
}

impl SortOrder {
    /// Pool the randomized intents draw from
    pub const POOL: [SortOrder; 3] = [
        SortOrder::PopularityDesc,
        SortOrder::VoteAverageDesc,
        SortOrder::VoteCountDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PopularityDesc => "popularity.desc",
            SortOrder::VoteAverageDesc => "vote_average.desc",
            SortOrder::VoteCountDesc => "vote_count.desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a request ended in the fallback result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Nothing left after normalization
    EmptyInput,
    /// The language-model call failed (network, auth, quota, timeout)
    LanguageModelUnavailable,
    /// No JSON object could be extracted from the model's answer
    UnparseableResponse,
    /// JSON was found but didn't fit the analysis shape
    InvalidSchema,
    /// The model says the request isn't about this domain
    NotDomainRelated,
    /// Related, but none of the fields we route on were filled
    NoUsableFields,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::EmptyInput => "empty_input",
            FallbackReason::LanguageModelUnavailable => "language_model_unavailable",
            FallbackReason::UnparseableResponse => "unparseable_response",
            FallbackReason::InvalidSchema => "invalid_schema",
            FallbackReason::NotDomainRelated => "not_domain_related",
            FallbackReason::NoUsableFields => "no_usable_fields",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&crate::error::AnalysisError> for FallbackReason {
    fn from(err: &crate::error::AnalysisError) -> Self {
        use crate::error::AnalysisError;
        match err {
            AnalysisError::Capability(_) => FallbackReason::LanguageModelUnavailable,
            AnalysisError::Parse(_) => FallbackReason::UnparseableResponse,
            AnalysisError::Schema { .. } => FallbackReason::InvalidSchema,
        }
    }
}

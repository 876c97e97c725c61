//! Intent routing for movie and music recommendation requests
//!
//! Turns a free-text request ("비 오는 날 볼 영화 추천해줘") into a
//! [`RoutingResult`] that tells the caller which backend to query and with
//! which parameters.
//!
//! ## Architecture
//!
//! ```text
//! User Text → Normalizer → Rule Cascade ─(hit)─→ Composer → RoutingResult
//!                               │
//!                             (miss)
//!                               ↓
//!                  LlmClient → Response Parser → Composer → RoutingResult
//!                               │
//!                            (failure)
//!                               ↓
//!                        Fallback RoutingResult
//! ```
//!
//! Routing never fails: every error on the language-model path ends in a
//! fallback result that names the reason.
//!
//! ## Backend Selection
//!
//! Set `LLM_BACKEND` environment variable:
//! - `gemini` (default): Google Gemini API
//! - `openai`: OpenAI API

// LLM client abstraction
pub mod llm;

// Routing core
pub mod composer;
pub mod error;
pub mod extractors;
pub mod normalize;
pub mod random;
pub mod response_parser;
pub mod routing;
pub mod rules;

// Domains
pub mod movie;
pub mod music;

mod analysis;

// Re-exports for convenience
pub use composer::IntentComposer;
pub use error::{AnalysisError, CapabilityError, ParseError, RulesError};
pub use llm::{create_llm_client, LlmBackend, LlmClient, LlmConfig};
pub use movie::{MovieAnalysis, MovieIntent, MovieRouter};
pub use music::{MusicAnalysis, MusicIntent, MusicIntentType, MusicRouter};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use response_parser::JsonExtraction;
pub use routing::{FallbackReason, Payload, Route, RoutingResult, SortOrder};
pub use rules::{RuleBook, RuleLoader};

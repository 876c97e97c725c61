//! Serde shapes of the rules file

use serde::{Deserialize, Serialize};

/// Top-level rules file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub composition: CompositionConfig,
    pub movie: MovieRulesConfig,
    pub music: MusicVocabulary,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Constants stamped onto every recommendation payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionConfig {
    /// Minimum TMDB vote average
    pub min_vote: f64,
    /// Pages are drawn uniformly from `1..=max_page`
    pub max_page: u32,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            min_vote: 6.0,
            max_page: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRulesConfig {
    /// Regexes with one capture group for the reference title, tried in order
    pub title_patterns: Vec<String>,
    pub situational_keywords: Vec<String>,
    pub weather: Vec<KeywordRule>,
    pub mood: Vec<KeywordRule>,
}

/// One category of the weather or mood table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Category key, e.g. "rain" or "sad"
    pub key: String,
    /// Substrings that select this category
    pub keywords: Vec<String>,
    /// TMDB genre ids to prefer, in order
    pub genres: Vec<String>,
}

/// Closed vocabularies the music analysis is clamped to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MusicVocabulary {
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub weathers: Vec<String>,
}

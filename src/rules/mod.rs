//! Keyword and pattern tables
//!
//! The rule book is loaded once at startup and shared read-only between all
//! routers (`Arc<RuleBook>`). Nothing mutates it afterwards, so concurrent
//! routing needs no locking.

mod loader;
mod types;

pub use loader::{RuleLoader, RULES_PATH_ENV};
pub use types::{CompositionConfig, KeywordRule, MovieRulesConfig, MusicVocabulary, RulesConfig};

use regex::Regex;
use tracing::info;

use crate::error::RulesError;
use crate::normalize::normalize_text;

/// Default rules compiled into the binary
const BUILTIN_RULES: &str = include_str!("../../config/recommendation_rules.yaml");

/// Compiled, validated rule tables
#[derive(Debug, Clone)]
pub struct RuleBook {
    version: String,
    composition: CompositionConfig,
    title_patterns: Vec<Regex>,
    situational_keywords: Vec<String>,
    weather: Vec<KeywordRule>,
    mood: Vec<KeywordRule>,
    music: MusicVocabulary,
}

impl RuleBook {
    /// The production tables shipped with the crate
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_yaml_str(BUILTIN_RULES)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, RulesError> {
        let config: RulesConfig = serde_yaml::from_str(yaml)?;
        Self::from_config(config)
    }

    /// Compile patterns and normalize keywords.
    ///
    /// Keywords go through the same normalizer as request text so a table
    /// entry written in upper case or with odd spacing still matches.
    pub fn from_config(config: RulesConfig) -> Result<Self, RulesError> {
        let RulesConfig {
            version,
            composition,
            movie,
            music,
        } = config;

        if composition.max_page == 0 {
            return Err(RulesError::Invalid("composition.max_page must be at least 1".into()));
        }
        if !composition.min_vote.is_finite() {
            return Err(RulesError::Invalid("composition.min_vote must be a number".into()));
        }

        let title_patterns = movie
            .title_patterns
            .iter()
            .map(|pattern| compile_title_pattern(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let situational_keywords = normalize_keywords("situational_keywords", &movie.situational_keywords)?;
        let weather = normalize_table("weather", movie.weather)?;
        let mood = normalize_table("mood", movie.mood)?;

        let music = MusicVocabulary {
            contexts: normalize_vocabulary(music.contexts),
            moods: normalize_vocabulary(music.moods),
            weathers: normalize_vocabulary(music.weathers),
        };

        info!(
            "Loaded rule book v{}: {} title patterns, {} situational keywords, {} weather and {} mood categories",
            version,
            title_patterns.len(),
            situational_keywords.len(),
            weather.len(),
            mood.len()
        );

        Ok(Self {
            version,
            composition,
            title_patterns,
            situational_keywords,
            weather,
            mood,
            music,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn composition(&self) -> CompositionConfig {
        self.composition
    }

    pub fn title_patterns(&self) -> &[Regex] {
        &self.title_patterns
    }

    pub fn situational_keywords(&self) -> &[String] {
        &self.situational_keywords
    }

    pub fn weather(&self) -> &[KeywordRule] {
        &self.weather
    }

    pub fn mood(&self) -> &[KeywordRule] {
        &self.mood
    }

    pub fn music(&self) -> &MusicVocabulary {
        &self.music
    }

    /// Genre ids for a weather key; unknown keys get an empty list
    pub fn weather_genres(&self, key: &str) -> Vec<String> {
        genres_for(&self.weather, key)
    }

    /// Genre ids for a mood key; unknown keys get an empty list
    pub fn mood_genres(&self, key: &str) -> Vec<String> {
        genres_for(&self.mood, key)
    }
}

fn genres_for(table: &[KeywordRule], key: &str) -> Vec<String> {
    table
        .iter()
        .find(|rule| rule.key == key)
        .map(|rule| rule.genres.clone())
        .unwrap_or_default()
}

fn compile_title_pattern(pattern: &str) -> Result<Regex, RulesError> {
    let regex = Regex::new(pattern).map_err(|source| RulesError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;
    // group 0 is the whole match; the title lives in group 1
    if regex.captures_len() < 2 {
        return Err(RulesError::Invalid(format!(
            "title pattern '{}' has no capture group",
            pattern
        )));
    }
    Ok(regex)
}

fn normalize_keywords(table: &str, keywords: &[String]) -> Result<Vec<String>, RulesError> {
    keywords
        .iter()
        .map(|keyword| {
            let normalized = normalize_text(keyword);
            if normalized.is_empty() {
                // an empty substring would match every request
                Err(RulesError::Invalid(format!("{}: empty keyword", table)))
            } else {
                Ok(normalized)
            }
        })
        .collect()
}

fn normalize_table(table: &str, rules: Vec<KeywordRule>) -> Result<Vec<KeywordRule>, RulesError> {
    let mut seen = std::collections::HashSet::new();
    rules
        .into_iter()
        .map(|rule| {
            let key = normalize_text(&rule.key);
            if key.is_empty() {
                return Err(RulesError::Invalid(format!("{}: category with empty key", table)));
            }
            if !seen.insert(key.clone()) {
                return Err(RulesError::Invalid(format!("{}: duplicate category '{}'", table, key)));
            }
            let keywords = normalize_keywords(&format!("{}.{}", table, key), &rule.keywords)?;
            Ok(KeywordRule {
                key,
                keywords,
                genres: rule.genres,
            })
        })
        .collect()
}

fn normalize_vocabulary(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize_text(v))
        .filter(|v| !v.is_empty())
        .collect()
}

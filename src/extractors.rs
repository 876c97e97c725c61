//! Rule-based extractors
//!
//! Every extractor takes normalized text and either finds a classification or
//! doesn't. None of them touch the network. The movie cascade runs them in a
//! fixed priority order and stops at the first hit:
//!
//! 1. title seed ("인셉션 같은 영화")
//! 2. situational trigger ("충전하면서 볼 영화")
//! 3. weather ("비 오는 날")
//! 4. mood ("우울한데")

use regex::Regex;

use crate::rules::{KeywordRule, RuleBook};

/// Titles shorter than this (in characters) are treated as noise
pub const MIN_SEED_TITLE_CHARS: usize = 2;

/// What a rule (or the language model) decided the request is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// "Something like <title>"
    SimilarTitle(String),
    /// Short, interruptible viewing session (e.g. while charging the car)
    Situational,
    Weather(String),
    Mood(String),
}

/// Uniform extractor signature for the cascade
pub type Extractor = fn(&RuleBook, &str) -> Option<Classification>;

/// Movie extractors in priority order
pub const MOVIE_CASCADE: [(&str, Extractor); 4] = [
    ("title_seed", title_seed),
    ("situational", situational),
    ("weather", weather),
    ("mood", mood),
];

/// Run the movie cascade over normalized text. First hit wins.
pub fn classify_movie(rules: &RuleBook, normalized: &str) -> Option<(&'static str, Classification)> {
    MOVIE_CASCADE
        .iter()
        .find_map(|(name, extractor)| extractor(rules, normalized).map(|c| (*name, c)))
}

/// Find the reference title in "<title> like/similar-to" phrasing.
///
/// The first pattern that matches decides, even when its capture turns out
/// too short; later patterns are not tried in that case.
pub fn extract_seed_title(patterns: &[Regex], text: &str) -> Option<String> {
    let captures = patterns.iter().find_map(|pattern| pattern.captures(text))?;
    let seed = captures.get(1)?.as_str().trim();
    if seed.chars().count() >= MIN_SEED_TITLE_CHARS {
        Some(seed.to_string())
    } else {
        None
    }
}

/// First category (in table order) with a keyword contained in the text
pub fn extract_category<'a>(table: &'a [KeywordRule], text: &str) -> Option<&'a KeywordRule> {
    table
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| text.contains(k.as_str())))
}

pub fn is_situational_request(keywords: &[String], text: &str) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

fn title_seed(rules: &RuleBook, text: &str) -> Option<Classification> {
    extract_seed_title(rules.title_patterns(), text).map(Classification::SimilarTitle)
}

fn situational(rules: &RuleBook, text: &str) -> Option<Classification> {
    is_situational_request(rules.situational_keywords(), text).then_some(Classification::Situational)
}

fn weather(rules: &RuleBook, text: &str) -> Option<Classification> {
    extract_category(rules.weather(), text).map(|rule| Classification::Weather(rule.key.clone()))
}

fn mood(rules: &RuleBook, text: &str) -> Option<Classification> {
    extract_category(rules.mood(), text).map(|rule| Classification::Mood(rule.key.clone()))
}

//! Error types for the routing layer
//!
//! None of these ever escape `route`: the routers catch them and emit a
//! fallback result. They exist so the failure can be logged with its detail
//! and mapped to a [`FallbackReason`](crate::routing::FallbackReason).

use thiserror::Error;

/// The language model's text did not contain a usable JSON object
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no JSON object found in language model response")]
    NoJsonObject { raw: String },

    #[error("language model response contained invalid JSON: {source}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    /// Raw response text, kept for diagnostics
    pub fn raw(&self) -> &str {
        match self {
            ParseError::NoJsonObject { raw } | ParseError::InvalidJson { raw, .. } => raw,
        }
    }
}

/// The external language-model call itself failed
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid LLM configuration: {0}")]
    Config(String),
}

/// Any failure on the language-understanding path
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("language model call failed: {0}")]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("language model JSON does not match the expected shape: {source}")]
    Schema {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Rule book could not be loaded. Only raised at startup.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid title pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid rule book: {0}")]
    Invalid(String),
}

//! Rules file loader
//!
//! Loads the keyword tables from a YAML file so they can be edited without a
//! rebuild. Without an explicit path the built-in tables are used.

use std::path::{Path, PathBuf};

use tracing::info;

use super::RuleBook;
use crate::error::RulesError;

/// Env var naming an override rules file
pub const RULES_PATH_ENV: &str = "RECHARGE_RULES_PATH";

#[derive(Debug, Clone, Default)]
pub struct RuleLoader {
    path: Option<PathBuf>,
}

impl RuleLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Loader that always yields the built-in tables
    pub fn builtin() -> Self {
        Self { path: None }
    }

    /// Create loader from RECHARGE_RULES_PATH env var or fall back to the built-in tables
    pub fn from_env() -> Self {
        match std::env::var(RULES_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self::builtin(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn load(&self) -> Result<RuleBook, RulesError> {
        match &self.path {
            Some(path) => {
                info!("Loading routing rules from {}", path.display());
                let content = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                RuleBook::from_yaml_str(&content)
            }
            None => {
                info!("Using built-in routing rules");
                RuleBook::builtin()
            }
        }
    }
}

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::detector::SanitizerError;
use crate::patterns::{BLOCKED_SCHEMES, MAX_LENGTH, SQL_KEYWORDS, SUSPICIOUS_PARAMS};

/// Immutable sanitizer settings, built once at startup.
///
/// Every field falls back to the built-in tables in [`crate::patterns`], so an
/// empty YAML mapping deserializes to the stock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizerConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_blocked_schemes")]
    pub blocked_schemes: Vec<String>,
    #[serde(default = "default_suspicious_params")]
    pub suspicious_params: Vec<String>,
    #[serde(default = "default_sql_keywords")]
    pub sql_keywords: Vec<SqlKeyword>,
}

/// An owned, named SQL keyword fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlKeyword {
    pub name: String,
    pub pattern: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            blocked_schemes: default_blocked_schemes(),
            suspicious_params: default_suspicious_params(),
            sql_keywords: default_sql_keywords(),
        }
    }
}

impl SanitizerConfig {
    /// Reject settings that would silently disable a defense.
    pub fn validate(&self) -> Result<(), SanitizerError> {
        if self.max_length == 0 {
            return Err(SanitizerError::InvalidConfig(
                "max_length must be greater than zero".to_string(),
            ));
        }
        if self.blocked_schemes.iter().any(|s| s.trim().is_empty()) {
            return Err(SanitizerError::InvalidConfig(
                "blocked scheme must not be empty".to_string(),
            ));
        }
        if self.suspicious_params.iter().any(|p| p.trim().is_empty()) {
            return Err(SanitizerError::InvalidConfig(
                "suspicious parameter must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for kw in &self.sql_keywords {
            if kw.name.is_empty() || kw.pattern.is_empty() {
                return Err(SanitizerError::InvalidConfig(
                    "sql keyword name and pattern must not be empty".to_string(),
                ));
            }
            if !seen.insert(kw.name.as_str()) {
                return Err(SanitizerError::InvalidConfig(format!(
                    "duplicate sql keyword name: '{}'",
                    kw.name
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_max_length() -> usize {
    MAX_LENGTH
}

fn default_blocked_schemes() -> Vec<String> {
    BLOCKED_SCHEMES.iter().map(|s| s.to_string()).collect()
}

fn default_suspicious_params() -> Vec<String> {
    SUSPICIOUS_PARAMS.iter().map(|s| s.to_string()).collect()
}

fn default_sql_keywords() -> Vec<SqlKeyword> {
    SQL_KEYWORDS
        .iter()
        .map(|kw| SqlKeyword {
            name: kw.name.to_string(),
            pattern: kw.pattern.to_string(),
        })
        .collect()
}

//! Compiled threat detector.
//!
//! Turns a [`SanitizerConfig`] into ready-to-run regexes once, at startup.
//! Detection is a heuristic deny-list, not a parser: it catches the exploit
//! shapes seen in form traffic and nothing more.  Queries built from the
//! sanitized text must still use parameter binding.

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use crate::config::SanitizerConfig;
use crate::patterns::ThreatSignature;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while constructing a [`Detector`] or a
/// [`Sanitizer`](crate::sanitizer::Sanitizer).
#[derive(Debug, thiserror::Error)]
pub enum SanitizerError {
    #[error("failed to compile regex pattern: {0}")]
    RegexCompile(#[from] regex::Error),

    #[error("invalid sanitizer configuration: {0}")]
    InvalidConfig(String),
}

// ---------------------------------------------------------------------------
// Threat
// ---------------------------------------------------------------------------

/// Why an answer was rejected.
///
/// Carries the rule that fired and where, never the submitted text itself,
/// so it is safe to log and persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    pub signature: ThreatSignature,
    /// Name of the rule that matched (e.g. `"leading_scheme"`, `"drop_table"`).
    pub pattern: String,
    /// Byte offset of the match within the text being checked.
    pub offset: usize,
}

impl Threat {
    fn new(signature: ThreatSignature, pattern: impl Into<String>, offset: usize) -> Self {
        Self {
            signature,
            pattern: pattern.into(),
            offset,
        }
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Pre-compiled scheme and SQL keyword matchers.
///
/// The SQL keywords are held both as a [`RegexSet`], which answers "does
/// anything match" in one pass, and as individual [`Regex`] values in the
/// same order for reporting the name and offset of the first hit.
pub struct Detector {
    leading_scheme: Regex,
    scheme_param: Regex,
    suspicious_param: Regex,
    sql_comment: Regex,
    keyword_set: RegexSet,
    keywords: Vec<(String, Regex)>,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("num_keywords", &self.keywords.len())
            .finish()
    }
}

impl Detector {
    /// Validate `config` and compile every pattern it names.
    pub fn new(config: &SanitizerConfig) -> Result<Self, SanitizerError> {
        config.validate()?;

        let schemes = alternation(&config.blocked_schemes);
        let params = alternation(&config.suspicious_params);

        let leading_scheme = Regex::new(&format!(r"(?i)^\s*(?:{schemes})\s*:"))?;
        let scheme_param = Regex::new(&format!(r"(?i)[?&][^=&?#\s]+=\s*(?:{schemes})\s*:"))?;
        let suspicious_param = Regex::new(&format!(r"(?i)[?&](?:{params})="))?;
        let sql_comment = Regex::new(r"(?m)--.*$")?;

        let keyword_patterns: Vec<String> = config
            .sql_keywords
            .iter()
            .map(|kw| whole_word(&kw.pattern))
            .collect();

        let keyword_set = RegexSet::new(&keyword_patterns)?;

        let keywords = config
            .sql_keywords
            .iter()
            .zip(&keyword_patterns)
            .map(|(kw, p)| Regex::new(p).map(|re| (kw.name.clone(), re)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            leading_scheme,
            scheme_param,
            suspicious_param,
            sql_comment,
            keyword_set,
            keywords,
        })
    }

    /// Check `text` for a script-capable scheme at the start, a parameter
    /// whose value starts with one, or a parameter key that is rejected
    /// outright.
    pub fn detect_scheme(&self, text: &str) -> Option<Threat> {
        if let Some(m) = self.leading_scheme.find(text) {
            return Some(Threat::new(
                ThreatSignature::MaliciousScheme,
                "leading_scheme",
                m.start(),
            ));
        }
        if let Some(m) = self.scheme_param.find(text) {
            return Some(Threat::new(
                ThreatSignature::MaliciousScheme,
                "scheme_in_parameter",
                m.start(),
            ));
        }
        self.suspicious_param.find(text).map(|m| {
            Threat::new(
                ThreatSignature::MaliciousScheme,
                "suspicious_parameter",
                m.start(),
            )
        })
    }

    /// Remove statement terminators and `--` line comments.
    ///
    /// Semicolons go first: removing them can join two dashes into a comment
    /// marker, which must then be stripped in the same pass.
    pub fn strip_sql(&self, text: &str) -> String {
        let without_terminators = text.replace(';', "");
        self.sql_comment
            .replace_all(&without_terminators, "")
            .into_owned()
    }

    /// Return the first keyword (in catalogue order) found in `text`.
    pub fn detect_sql(&self, text: &str) -> Option<Threat> {
        let idx = self.keyword_set.matches(text).into_iter().next()?;
        let (name, re) = &self.keywords[idx];
        let offset = re.find(text).map(|m| m.start()).unwrap_or_default();
        Some(Threat::new(ThreatSignature::SqlInjectionSuspected, name, offset))
    }

    /// Returns the number of compiled SQL keywords.
    #[cfg(test)]
    fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

/// Anchor a keyword fragment to word boundaries.  The trailing boundary is
/// only added after a literal word character, so fragments ending in `\(`
/// or a quantifier keep matching.
fn whole_word(fragment: &str) -> String {
    let ends_in_word = fragment
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    if ends_in_word {
        format!(r"(?i)\b(?:{fragment})\b")
    } else {
        format!(r"(?i)\b(?:{fragment})")
    }
}

/// Build a regex alternation from literal words.
fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w.trim()))
        .collect::<Vec<_>>()
        .join("|")
}

//! The sanitization pipeline for a single answer.
//!
//! Stages run in a fixed order, each feeding the next:
//!
//! 1. trim, and short-circuit on empty input
//! 2. Unicode NFC normalization
//! 3. removal of control and zero-width characters
//! 4. malicious-scheme check
//! 5. removal of `;` and `--` comments, then a second scheme check and the
//!    SQL keyword check
//! 6. HTML escaping
//! 7. length cap
//!
//! Reordering these stages reopens injection vectors: pattern checks must
//! see normalized, visible text, and escaping must run after every check so
//! that entity characters are never re-read as input.

use tracing::{trace, warn};
use unicode_normalization::UnicodeNormalization;

use crate::config::SanitizerConfig;
use crate::detector::{Detector, SanitizerError, Threat};
use crate::patterns::{escape_for, INVISIBLE_CHARS};

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// The outcome of [`Sanitizer::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// Escaped, length-capped text that is safe to forward.
    Clean(String),
    /// The answer was empty or contained only whitespace and invisible
    /// characters.
    Empty,
    /// The answer matched a threat rule and was discarded.
    Rejected(Threat),
}

impl Sanitized {
    /// The forwarded text: the clean string, or `""` for empty and rejected
    /// answers.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clean(text) => text,
            Self::Empty | Self::Rejected(_) => "",
        }
    }

    /// Collapse to the plain-string form used at the glue boundary.
    pub fn into_text(self) -> String {
        match self {
            Self::Clean(text) => text,
            Self::Empty | Self::Rejected(_) => String::new(),
        }
    }

    /// The threat behind a rejection, if any.
    pub fn threat(&self) -> Option<&Threat> {
        match self {
            Self::Rejected(threat) => Some(threat),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sanitizer
// ---------------------------------------------------------------------------

/// Stateless answer sanitizer.
///
/// Construct once at startup and share by reference; every call works only
/// on its own locals.
///
/// # Example
///
/// ```rust
/// use answer_sanitizer::{Sanitized, Sanitizer};
///
/// let sanitizer = Sanitizer::default();
/// assert_eq!(sanitizer.check("Tom & Jerry"), Sanitized::Clean("Tom &amp; Jerry".into()));
/// assert!(sanitizer.check("javascript:alert(1)").threat().is_some());
/// assert_eq!(sanitizer.sanitize(None), None);
/// ```
#[derive(Debug)]
pub struct Sanitizer {
    detector: Detector,
    max_length: usize,
}

impl Sanitizer {
    /// Validate `config` and compile its detection patterns.
    pub fn new(config: SanitizerConfig) -> Result<Self, SanitizerError> {
        let detector = Detector::new(&config)?;
        Ok(Self {
            detector,
            max_length: config.max_length,
        })
    }

    /// Maximum output length in UTF-16 code units.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Sanitize an optional answer, collapsing empty and rejected outcomes to
    /// `""`.  `None` means "no answer" and passes through unchanged.
    pub fn sanitize(&self, value: Option<&str>) -> Option<String> {
        value.map(|v| self.check(v).into_text())
    }

    /// Run the full pipeline over `raw` and report what happened.
    pub fn check(&self, raw: &str) -> Sanitized {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Sanitized::Empty;
        }

        let normalized: String = trimmed.nfc().collect();
        let mut visible = strip_invisible(&normalized);
        // Removing a character can bring a base letter next to its combining
        // mark, so compose again.
        if visible.len() != normalized.len() {
            visible = visible.nfc().collect();
        }
        if visible.trim().is_empty() {
            return Sanitized::Empty;
        }

        if let Some(threat) = self.detector.detect_scheme(&visible) {
            return reject(threat);
        }

        // Stripping may assemble a scheme that was split by `;`, so the
        // scheme check runs again on the result.
        let stripped = self.detector.strip_sql(&visible);
        let threat = self
            .detector
            .detect_scheme(&stripped)
            .or_else(|| self.detector.detect_sql(&stripped));
        if let Some(threat) = threat {
            return reject(threat);
        }

        let escaped = escape_html(&stripped);
        let capped = truncate_escaped(&escaped, self.max_length);
        let output = capped.trim();

        trace!(
            input_len = raw.len(),
            output_len = output.len(),
            "answer sanitized"
        );

        if output.is_empty() {
            Sanitized::Empty
        } else {
            Sanitized::Clean(output.to_string())
        }
    }
}

impl Default for Sanitizer {
    /// Constructs a sanitizer from the built-in tables.
    ///
    /// # Panics
    ///
    /// Panics if the built-in tables fail to compile (should never happen with
    /// the static patterns).
    fn default() -> Self {
        Self::new(SanitizerConfig::default()).expect("built-in patterns must compile")
    }
}

fn reject(threat: Threat) -> Sanitized {
    warn!(
        signature = %threat.signature,
        pattern = %threat.pattern,
        offset = threat.offset,
        "answer rejected"
    );
    Sanitized::Rejected(threat)
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}') || INVISIBLE_CHARS.contains(&c)
}

/// Drop ASCII control characters and zero-width formatting characters.
fn strip_invisible(text: &str) -> String {
    text.chars().filter(|c| !is_invisible(*c)).collect()
}

/// Replace HTML-significant characters with their entities in one pass.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match escape_for(c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

/// Keep at most `max` UTF-16 code units of escaped `text`.
///
/// Never splits a character, and never keeps part of an entity: a cut that
/// lands inside `&...;` moves back to the `&`.  Escaped text contains `&`
/// only at entity starts and `;` only at entity ends.
pub(crate) fn truncate_escaped(text: &str, max: usize) -> &str {
    let mut units = 0;
    let mut cut = text.len();
    for (idx, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max {
            cut = idx;
            break;
        }
    }

    let kept = &text[..cut];
    match kept.rfind('&') {
        Some(amp) if !kept[amp..].contains(';') => &kept[..amp],
        _ => kept,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

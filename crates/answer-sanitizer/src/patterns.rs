//! Built-in detection tables.
//!
//! Holds the constants the sanitizer falls back to when no configuration
//! overrides them: the length cap, the HTML escape map, the blocked URL
//! schemes, the query-parameter keys treated as injection carriers, and the
//! SQL keyword fragments.  Keyword fragments are regex strings compiled once
//! by [`crate::detector::Detector`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a sanitized answer, in UTF-16 code units.
pub const MAX_LENGTH: usize = 1000;

/// Characters escaped on output and their entity replacements.
pub const ESCAPE_MAP: &[(char, &str)] = &[
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#39;"),
];

/// URL schemes that execute or embed content when followed.
pub const BLOCKED_SCHEMES: &[&str] = &["javascript", "data", "vbscript"];

/// Query-parameter keys rejected regardless of their value.
pub const SUSPICIOUS_PARAMS: &[&str] = &["code", "userInput", "redirect"];

/// Zero-width and formatting characters removed before pattern matching.
pub const INVISIBLE_CHARS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

// ---------------------------------------------------------------------------
// Threat signature
// ---------------------------------------------------------------------------

/// Classification of a detected threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatSignature {
    /// A script-capable URL scheme, or a parameter known to smuggle one.
    MaliciousScheme,
    /// A SQL keyword sequence typical of injection payloads.
    SqlInjectionSuspected,
}

impl fmt::Display for ThreatSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaliciousScheme => write!(f, "malicious-scheme"),
            Self::SqlInjectionSuspected => write!(f, "sql-injection-suspected"),
        }
    }
}

// ---------------------------------------------------------------------------
// SQL keyword catalogue
// ---------------------------------------------------------------------------

/// A single named SQL keyword fragment.
pub struct KeywordPattern {
    /// Short, snake_case identifier used in logs and audit entries.
    pub name: &'static str,
    /// Case-insensitivity and word boundaries are added at compile time.
    pub pattern: &'static str,
}

/// The built-in SQL keyword list.
pub static SQL_KEYWORDS: &[KeywordPattern] = &[
    KeywordPattern {
        name: "union_select",
        pattern: r"union\s+select",
    },
    KeywordPattern {
        name: "drop_table",
        pattern: r"drop\s+table",
    },
    KeywordPattern {
        name: "insert_into",
        pattern: r"insert\s+into",
    },
    KeywordPattern {
        name: "delete_from",
        pattern: r"delete\s+from",
    },
    KeywordPattern {
        name: "update_set",
        pattern: r"update\s+\w+\s+set",
    },
    KeywordPattern {
        name: "exec_xp",
        pattern: r"exec\s+xp_\w+",
    },
    KeywordPattern {
        name: "benchmark",
        pattern: r"benchmark\s*\(",
    },
    KeywordPattern {
        name: "sleep",
        pattern: r"sleep\s*\(",
    },
    KeywordPattern {
        name: "pg_sleep",
        pattern: r"pg_sleep\s*\(",
    },
];

/// Look up the entity for `c`, if it is one of the escaped characters.
pub fn escape_for(c: char) -> Option<&'static str> {
    ESCAPE_MAP
        .iter()
        .find(|(raw, _)| *raw == c)
        .map(|(_, entity)| *entity)
}

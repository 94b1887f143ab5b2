//! # answer-sanitizer
//!
//! Cleans free-text answers from untrusted form submissions before they are
//! forwarded to the backend API.
//!
//! The crate is organised in layers:
//!
//! 1. **[`patterns`]** -- built-in tables: length cap, escape map, blocked
//!    schemes, suspicious parameter keys, SQL keyword fragments.
//! 2. **[`config`]** -- [`SanitizerConfig`](config::SanitizerConfig), the
//!    immutable settings the tables default into.
//! 3. **[`detector`]** -- compiles the configuration into regexes and reports
//!    [`Threat`](detector::Threat) values.
//! 4. **[`sanitizer`]** -- the ordered pipeline producing a
//!    [`Sanitized`](sanitizer::Sanitized) outcome.
//! 5. **[`extractor`]** -- fetches a field's answer through the
//!    [`submission`] traits and sanitizes every value.
//!
//! ## Quick start
//!
//! ```rust
//! use answer_sanitizer::Sanitizer;
//!
//! let sanitizer = Sanitizer::default();
//! assert_eq!(sanitizer.sanitize(Some(" <b>hi</b> ")).as_deref(), Some("&lt;b&gt;hi&lt;/b&gt;"));
//! assert_eq!(sanitizer.sanitize(Some("a'; DROP TABLE users; --")).as_deref(), Some(""));
//! ```

pub mod config;
pub mod detector;
pub mod extractor;
pub mod patterns;
pub mod sanitizer;
pub mod submission;

pub use config::{SanitizerConfig, SqlKeyword};
pub use detector::{Detector, SanitizerError, Threat};
pub use extractor::{extract, ExtractError, Extracted};
pub use patterns::{ThreatSignature, MAX_LENGTH};
pub use sanitizer::{escape_html, Sanitized, Sanitizer};
pub use submission::{
    FieldHandle, FormDefinition, FormResponse, RawValue, SubmissionRecord, SubmissionSource,
};

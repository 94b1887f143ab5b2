//! Pulls one field's answer out of a submission and sanitizes it.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::detector::Threat;
use crate::sanitizer::{truncate_escaped, Sanitized, Sanitizer};
use crate::submission::{RawValue, SubmissionRecord, SubmissionSource};

/// Errors surfaced by [`extract`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The identifier does not name a question in the form.  This is a
    /// wiring defect, not a data-quality issue.
    #[error("unknown field identifier: '{field_id}'")]
    UnknownField { field_id: String },
}

/// A sanitized answer, shaped like the raw one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Single(Sanitized),
    Multiple(Vec<Sanitized>),
}

impl Extracted {
    /// Render as JSON, with empty and rejected answers as `""`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(value) => Value::String(value.as_str().to_string()),
            Self::Multiple(values) => Value::Array(
                values
                    .iter()
                    .map(|v| Value::String(v.as_str().to_string()))
                    .collect(),
            ),
        }
    }

    /// Every threat that caused a value to be discarded, in answer order.
    pub fn rejections(&self) -> Vec<&Threat> {
        match self {
            Self::Single(value) => value.threat().into_iter().collect(),
            Self::Multiple(values) => values.iter().filter_map(Sanitized::threat).collect(),
        }
    }
}

/// Fetch and sanitize the answer to `field_id`.
///
/// An unanswered question yields `Single(Sanitized::Empty)`.  Multi-answer
/// values come back as a new vector of the same length and order; with
/// `lowercase` set, each clean element is lower-cased (for identifiers such
/// as email addresses).
pub fn extract<S, R>(
    sanitizer: &Sanitizer,
    source: &S,
    record: &R,
    field_id: &str,
    lowercase: bool,
) -> Result<Extracted, ExtractError>
where
    S: SubmissionSource + ?Sized,
    R: SubmissionRecord + ?Sized,
{
    let field = source
        .resolve(field_id)
        .ok_or_else(|| ExtractError::UnknownField {
            field_id: field_id.to_string(),
        })?;

    let raw = record.answer(&field).unwrap_or_default();
    debug!(field_id, multi = matches!(raw, RawValue::Sequence(_)), "extracting answer");

    let extracted = match raw {
        RawValue::Scalar(text) => Extracted::Single(sanitizer.check(&text)),
        RawValue::Sequence(items) => Extracted::Multiple(
            items
                .iter()
                .map(|item| {
                    let value = sanitizer.check(item);
                    if lowercase {
                        lower(value, sanitizer.max_length())
                    } else {
                        value
                    }
                })
                .collect(),
        ),
    };

    Ok(extracted)
}

/// Lower-case a clean value, re-applying the cap since lower-casing can
/// lengthen some characters.
fn lower(value: Sanitized, max_length: usize) -> Sanitized {
    match value {
        Sanitized::Clean(text) => {
            let lowered = text.to_lowercase();
            Sanitized::Clean(truncate_escaped(&lowered, max_length).to_string())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::patterns::ThreatSignature;
    use crate::submission::{FieldHandle, FormDefinition, FormResponse};

    fn form() -> FormDefinition {
        FormDefinition {
            form_id: "form-1".into(),
            fields: ["name", "emails", "notes", "tags"]
                .iter()
                .map(|id| FieldHandle {
                    id: id.to_string(),
                    title: None,
                })
                .collect(),
        }
    }

    fn response() -> FormResponse {
        let mut answers = HashMap::new();
        answers.insert("name".to_string(), Some(RawValue::Scalar("  Ana <b> ".into())));
        answers.insert(
            "emails".to_string(),
            Some(RawValue::Sequence(vec![
                "Foo@Bar.com".into(),
                "BAZ@qux.com".into(),
            ])),
        );
        answers.insert(
            "tags".to_string(),
            Some(RawValue::Sequence(vec![
                "Math".into(),
                "javascript:alert(1)".into(),
                "   ".into(),
            ])),
        );
        FormResponse {
            response_id: Some("resp-1".into()),
            answers,
        }
    }

    #[test]
    fn scalar_is_sanitized() {
        let s = Sanitizer::default();
        let out = extract(&s, &form(), &response(), "name", false).unwrap();
        assert_eq!(out, Extracted::Single(Sanitized::Clean("Ana &lt;b&gt;".into())));
    }

    #[test]
    fn sequence_is_lowercased_on_request() {
        let s = Sanitizer::default();
        let out = extract(&s, &form(), &response(), "emails", true).unwrap();
        assert_eq!(out.to_json(), serde_json::json!(["foo@bar.com", "baz@qux.com"]));
    }

    #[test]
    fn sequence_keeps_case_by_default() {
        let s = Sanitizer::default();
        let out = extract(&s, &form(), &response(), "emails", false).unwrap();
        assert_eq!(out.to_json(), serde_json::json!(["Foo@Bar.com", "BAZ@qux.com"]));
    }

    #[test]
    fn sequence_preserves_length_and_order() {
        let s = Sanitizer::default();
        let out = extract(&s, &form(), &response(), "tags", false).unwrap();
        match &out {
            Extracted::Multiple(values) => {
                assert_eq!(values.len(), 3);
                assert_eq!(values[0], Sanitized::Clean("Math".into()));
                assert!(values[1].threat().is_some());
                assert_eq!(values[2], Sanitized::Empty);
            }
            other => panic!("expected multiple values, got {other:?}"),
        }
        assert_eq!(out.to_json(), serde_json::json!(["Math", "", ""]));
    }

    #[test]
    fn caller_data_is_not_mutated() {
        let s = Sanitizer::default();
        let resp = response();
        let before = resp.answers.get("emails").cloned();
        let _ = extract(&s, &form(), &resp, "emails", true).unwrap();
        assert_eq!(resp.answers.get("emails").cloned(), before);
    }

    #[test]
    fn unanswered_field_is_empty() {
        let s = Sanitizer::default();
        let out = extract(&s, &form(), &response(), "notes", false).unwrap();
        assert_eq!(out, Extracted::Single(Sanitized::Empty));
        assert_eq!(out.to_json(), serde_json::json!(""));
    }

    #[test]
    fn unknown_field_is_a_hard_error() {
        let s = Sanitizer::default();
        let err = extract(&s, &form(), &response(), "missing", false).unwrap_err();
        assert!(matches!(err, ExtractError::UnknownField { ref field_id } if field_id == "missing"));
        assert!(err.to_string().contains("unknown field identifier"));
    }

    #[test]
    fn rejections_are_reported() {
        let s = Sanitizer::default();
        let out = extract(&s, &form(), &response(), "tags", false).unwrap();
        let rejections = out.rejections();
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].signature, ThreatSignature::MaliciousScheme);
    }
}

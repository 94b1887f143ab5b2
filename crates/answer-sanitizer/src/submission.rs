//! Submission records and the accessor traits the extractor reads through.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The raw answer to one question: a single value, or an ordered list for
/// multi-answer questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl Default for RawValue {
    fn default() -> Self {
        Self::Scalar(String::new())
    }
}

/// A resolved question within a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHandle {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Resolves field identifiers to handles.
pub trait SubmissionSource {
    /// `None` means the identifier does not name a question in this source.
    fn resolve(&self, field_id: &str) -> Option<FieldHandle>;
}

/// Reads answers out of one submission.
pub trait SubmissionRecord {
    /// `None` means the question was left unanswered.
    fn answer(&self, field: &FieldHandle) -> Option<RawValue>;
}

// ---------------------------------------------------------------------------
// In-memory model
// ---------------------------------------------------------------------------

/// A form's question list, as exported alongside its submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    pub form_id: String,
    #[serde(default)]
    pub fields: Vec<FieldHandle>,
}

impl SubmissionSource for FormDefinition {
    fn resolve(&self, field_id: &str) -> Option<FieldHandle> {
        self.fields.iter().find(|f| f.id == field_id).cloned()
    }
}

/// One submitted response, answers keyed by field identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormResponse {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub answers: HashMap<String, Option<RawValue>>,
}

impl SubmissionRecord for FormResponse {
    fn answer(&self, field: &FieldHandle) -> Option<RawValue> {
        self.answers.get(&field.id).cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_decodes_scalar_and_sequence() {
        let scalar: RawValue = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(scalar, RawValue::Scalar("hello".into()));

        let seq: RawValue = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(seq, RawValue::Sequence(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn form_definition_resolves_known_fields_only() {
        let form: FormDefinition = serde_json::from_str(
            r#"{"form_id": "f1", "fields": [{"id": "q1", "title": "Name"}, {"id": "q2"}]}"#,
        )
        .unwrap();
        assert_eq!(form.resolve("q1").and_then(|h| h.title), Some("Name".into()));
        assert!(form.resolve("q2").is_some());
        assert!(form.resolve("q3").is_none());
    }

    #[test]
    fn response_treats_null_and_missing_as_unanswered() {
        let response: FormResponse = serde_json::from_str(
            r#"{"response_id": "r1", "answers": {"q1": "x", "q2": null}}"#,
        )
        .unwrap();
        let handle = |id: &str| FieldHandle {
            id: id.into(),
            title: None,
        };
        assert_eq!(response.answer(&handle("q1")), Some(RawValue::Scalar("x".into())));
        assert_eq!(response.answer(&handle("q2")), None);
        assert_eq!(response.answer(&handle("q3")), None);
    }
}

//! Assembles the outbound payload from a submission.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use answer_sanitizer::{extract, Sanitizer, SubmissionRecord, SubmissionSource, Threat};

use crate::config::FieldMapping;

/// The payload body plus every answer that was discarded while building it.
#[derive(Debug)]
pub struct Payload {
    pub body: Map<String, Value>,
    pub rejections: Vec<Rejection>,
}

/// An answer dropped by the sanitizer, for the audit trail.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub key: String,
    pub field_id: String,
    pub threat: Threat,
}

/// Extract and sanitize every mapped field.
///
/// An unknown field id aborts the whole payload: it means the mapping is
/// wired to the wrong form.
pub fn build<S, R>(
    sanitizer: &Sanitizer,
    source: &S,
    record: &R,
    fields: &[FieldMapping],
) -> Result<Payload>
where
    S: SubmissionSource + ?Sized,
    R: SubmissionRecord + ?Sized,
{
    let mut body = Map::new();
    let mut rejections = Vec::new();

    for mapping in fields {
        let extracted = extract(
            sanitizer,
            source,
            record,
            &mapping.field_id,
            mapping.lowercase,
        )
        .with_context(|| format!("failed to extract payload key '{}'", mapping.key))?;

        rejections.extend(extracted.rejections().into_iter().map(|threat| Rejection {
            key: mapping.key.clone(),
            field_id: mapping.field_id.clone(),
            threat: threat.clone(),
        }));

        let mut value = extracted.to_json();
        if mapping.nullify {
            value = nullify_empty(value);
        }
        debug!(key = %mapping.key, field_id = %mapping.field_id, "payload field assembled");
        body.insert(mapping.key.clone(), value);
    }

    Ok(Payload { body, rejections })
}

/// Replace empty strings with `null`, element-wise for arrays.
pub fn nullify_empty(value: Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(nullify_empty).collect()),
        other => other,
    }
}

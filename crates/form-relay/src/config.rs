use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use answer_sanitizer::SanitizerConfig;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    /// Payload keys and the form fields they are read from.
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `None` disables the audit trail.
    #[serde(default = "default_audit_path")]
    pub audit_log_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            audit_log_path: default_audit_path(),
        }
    }
}

/// One payload key and where its value comes from.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FieldMapping {
    /// Key in the outbound payload.
    pub key: String,
    /// Question identifier in the form.
    pub field_id: String,
    /// Lower-case each value of a multi-answer field.
    #[serde(default)]
    pub lowercase: bool,
    /// Send `null` instead of `""` when the answer is empty or rejected.
    #[serde(default)]
    pub nullify: bool,
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".to_string()
}

fn default_audit_path() -> Option<PathBuf> {
    Some(PathBuf::from("audit.jsonl"))
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load configuration from a YAML file.
///
/// Returns `None` when the file does not exist, so the caller can fall back
/// to defaults and report it once logging is up.
pub fn load(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    load_from_str(&contents)
        .map(Some)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Parse and validate a [`Config`] from a YAML string.
pub fn load_from_str(yaml: &str) -> Result<Config> {
    let config: Config = serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    for mapping in &config.fields {
        if mapping.key.is_empty() {
            bail!("field key must not be empty");
        }
        if mapping.field_id.is_empty() {
            bail!("field '{}' has an empty field_id", mapping.key);
        }
        if !seen.insert(&mapping.key) {
            bail!("duplicate field key: '{}'", mapping.key);
        }
    }

    config
        .sanitizer
        .validate()
        .context("invalid sanitizer settings")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_minimal_config() {
        let config = load_from_str("{}").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.audit_log_path, Some(PathBuf::from("audit.jsonl")));
        assert_eq!(config.sanitizer, SanitizerConfig::default());
        assert!(config.fields.is_empty());
    }

    #[test]
    fn load_full_config() {
        let yaml = r#"
logging:
  level: debug
  audit_log_path: null
sanitizer:
  max_length: 200
fields:
  - key: studentEmail
    field_id: "1a2b"
    lowercase: true
  - key: notes
    field_id: "3c4d"
    nullify: true
"#;
        let config = load_from_str(yaml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.audit_log_path.is_none());
        assert_eq!(config.sanitizer.max_length, 200);
        assert_eq!(config.sanitizer.blocked_schemes.len(), 3);
        assert_eq!(
            config.fields[0],
            FieldMapping {
                key: "studentEmail".into(),
                field_id: "1a2b".into(),
                lowercase: true,
                nullify: false,
            }
        );
        assert!(config.fields[1].nullify);
    }

    #[test]
    fn reject_duplicate_field_keys() {
        let yaml = r#"
fields:
  - key: email
    field_id: a
  - key: email
    field_id: b
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(
            err.to_string().contains("duplicate field key"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn reject_empty_field_id() {
        let yaml = r#"
fields:
  - key: email
    field_id: ""
"#;
        let err = load_from_str(yaml).unwrap_err();
        assert!(err.to_string().contains("empty field_id"), "unexpected error: {err}");
    }

    #[test]
    fn reject_invalid_sanitizer_settings() {
        let err = load_from_str("sanitizer:\n  max_length: 0\n").unwrap_err();
        assert!(
            err.to_string().contains("invalid sanitizer settings"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn missing_file_is_reported_as_none() {
        let loaded = load(Path::new("/does/not/exist.yaml")).unwrap();
        assert!(loaded.is_none());
        assert!(loaded.unwrap_or_default().fields.is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form-relay.yaml");
        std::fs::write(&path, "logging:\n  level: warn\n").unwrap();
        let config = load(&path).unwrap().expect("file exists");
        assert_eq!(config.logging.level, "warn");
    }
}

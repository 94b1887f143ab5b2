mod cli;
mod config;
mod payload;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use answer_sanitizer::{FormDefinition, FormResponse, Sanitizer};
use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource};

use crate::cli::Cli;
use crate::payload::Payload;

const COMPONENT: &str = "form-relay";

fn main() -> Result<()> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.  A missing file is reported
    //    after tracing is up.
    let loaded = config::load(&cli.config)?;
    let config_missing = loaded.is_none();
    let mut cfg = loaded.unwrap_or_default();

    if let Some(ref audit_log) = cli.audit_log {
        cfg.logging.audit_log_path = Some(audit_log.clone());
    }

    // 3. Init tracing-subscriber with JSON format.  Logs go to stderr; stdout
    //    carries only the payload.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if config_missing {
        warn!(
            path = %cli.config.display(),
            "configuration file not found; using defaults"
        );
    }

    info!(
        config_file = %cli.config.display(),
        form = %cli.form.display(),
        response = %cli.response.display(),
        fields = cfg.fields.len(),
        "form-relay starting"
    );

    // 4. Open the audit trail.
    let mut audit = match cfg.logging.audit_log_path {
        Some(ref path) => AuditSink::open(path).context("failed to open audit log")?,
        None => {
            warn!("audit log disabled");
            AuditSink::disabled()
        }
    };

    audit.log(&AuditEntry::new(
        AuditEventType::ProcessStarted,
        AuditSource::new(COMPONENT),
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "config_file": cli.config.display().to_string(),
        }),
    ));

    // 5. Process the submission.
    let result = relay(&cli, &cfg, &mut audit);

    // 6. Log shutdown.
    let outcome = match &result {
        Ok(()) => "ok".to_string(),
        Err(err) => format!("{err:#}"),
    };
    audit.log(&AuditEntry::new(
        AuditEventType::ProcessStopped,
        AuditSource::new(COMPONENT),
        serde_json::json!({ "result": outcome }),
    ));
    info!(audit_entries = audit.written(), "form-relay stopping");
    audit.close();

    result
}

/// Sanitize one submission and print its payload.
fn relay(cli: &Cli, cfg: &config::Config, audit: &mut AuditSink) -> Result<()> {
    let sanitizer =
        Sanitizer::new(cfg.sanitizer.clone()).context("failed to initialize sanitizer")?;

    let form: FormDefinition = read_json(&cli.form).context("failed to load form definition")?;
    let response: FormResponse =
        read_json(&cli.response).context("failed to load submission")?;

    let source = AuditSource::new(COMPONENT)
        .with_form(form.form_id.clone())
        .with_response(response.response_id.clone());

    audit.log(&AuditEntry::new(
        AuditEventType::SubmissionReceived,
        source.clone(),
        serde_json::json!({ "answers": response.answers.len() }),
    ));

    let Payload { body, rejections } = payload::build(&sanitizer, &form, &response, &cfg.fields)?;

    for rejection in &rejections {
        audit.log(&AuditEntry::new(
            AuditEventType::AnswerRejected,
            source.clone().with_field(rejection.field_id.clone()),
            serde_json::json!({
                "key": rejection.key,
                "signature": rejection.threat.signature.to_string(),
                "pattern": rejection.threat.pattern,
            }),
        ));
    }

    let body = serde_json::Value::Object(body);
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{rendered}");

    info!(
        form_id = %form.form_id,
        fields = cfg.fields.len(),
        rejected = rejections.len(),
        "payload emitted"
    );

    audit.log(&AuditEntry::new(
        AuditEventType::PayloadEmitted,
        source,
        serde_json::json!({
            "fields": cfg.fields.len(),
            "rejected": rejections.len(),
        }),
    ));

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

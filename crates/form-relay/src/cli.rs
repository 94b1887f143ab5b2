use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "form-relay",
    version,
    about = "Sanitize a form submission and print the outbound API payload"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "form-relay.yaml")]
    pub config: PathBuf,

    /// Form definition JSON (form_id and field list)
    #[arg(short, long)]
    pub form: PathBuf,

    /// Submission JSON (response_id and answers keyed by field id)
    #[arg(short, long)]
    pub response: PathBuf,

    /// Audit log path (overrides config file setting)
    #[arg(long)]
    pub audit_log: Option<PathBuf>,

    /// Pretty-print the payload
    #[arg(long)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_and_optional_args() {
        let cli = Cli::try_parse_from([
            "form-relay",
            "--form",
            "form.json",
            "-r",
            "resp.json",
            "--audit-log",
            "/tmp/a.jsonl",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("form-relay.yaml"));
        assert_eq!(cli.form, PathBuf::from("form.json"));
        assert_eq!(cli.response, PathBuf::from("resp.json"));
        assert_eq!(cli.audit_log, Some(PathBuf::from("/tmp/a.jsonl")));
        assert!(cli.pretty);
    }

    #[test]
    fn form_and_response_are_required() {
        assert!(Cli::try_parse_from(["form-relay", "--form", "f.json"]).is_err());
    }
}

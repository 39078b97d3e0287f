//! Command-line interface definitions for TruthLens.
//!
//! Every option can also be supplied through an environment variable, and
//! anything left unset falls back to the optional YAML config file and then
//! to the built-in defaults (see [`crate::config`]).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a TruthLens session.
///
/// # Examples
///
/// ```sh
/// # Classify against the hosted inference API, alerts disabled
/// HF_API_TOKEN=hf_xxx truthlens
///
/// # With email alerts
/// truthlens --alert-sender me@example.com --alert-receiver admin@example.com \
///     --alert-password "$APP_PASSWORD"
///
/// # Settings from a file
/// truthlens --config ./truthlens.yaml
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "TRUTHLENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the zero-shot inference service
    #[arg(long, env = "TRUTHLENS_INFERENCE_URL")]
    pub endpoint: Option<String>,

    /// Zero-shot classification model name
    #[arg(short, long, env = "TRUTHLENS_MODEL")]
    pub model: Option<String>,

    /// Bearer token for the inference service
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Address alerts are sent from (also the SMTP login)
    #[arg(long, env = "ALERT_EMAIL_SENDER")]
    pub alert_sender: Option<String>,

    /// SMTP password or app password for the sender
    #[arg(long, env = "ALERT_EMAIL_PASSWORD", hide_env_values = true)]
    pub alert_password: Option<String>,

    /// Address that receives fake news alerts
    #[arg(long, env = "ALERT_EMAIL_RECEIVER")]
    pub alert_receiver: Option<String>,

    /// SMTP server for alerts (implicit TLS)
    #[arg(long, env = "ALERT_SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP port for alerts
    #[arg(long, env = "ALERT_SMTP_PORT")]
    pub smtp_port: Option<u16>,

    /// Where `export` writes the session log
    #[arg(short, long, env = "TRUTHLENS_EXPORT_PATH")]
    pub export_path: Option<PathBuf>,
}

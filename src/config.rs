//! Runtime settings resolved from CLI flags, environment and an optional YAML file.
//!
//! Precedence is flag/env > file > default. Alert credentials have no
//! defaults at all: either all three are configured and alerts are enabled,
//! or none are and alerts are off.
//!
//! # File format
//!
//! ```yaml
//! classifier:
//!   endpoint: https://api-inference.huggingface.co
//!   model: facebook/bart-large-mnli
//!   api_token: hf_xxx
//! alerts:
//!   sender: me@example.com
//!   password: app-password
//!   receiver: admin@example.com
//!   smtp_host: smtp.gmail.com
//!   smtp_port: 465
//! export_path: log.csv
//! ```

use crate::cli::Cli;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "facebook/bart-large-mnli";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_EXPORT_PATH: &str = "log.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid inference endpoint `{endpoint}`: {source}")]
    Endpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("alert settings incomplete, missing: {}", .0.join(", "))]
    IncompleteAlerts(Vec<&'static str>),
}

/// Shape of the optional YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub classifier: ClassifierFileConfig,
    pub alerts: AlertFileConfig,
    pub export_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierFileConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertFileConfig {
    pub sender: Option<String>,
    pub password: Option<String>,
    pub receiver: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config file");
        Ok(parsed)
    }
}

/// Where and how to reach the zero-shot classifier.
#[derive(Clone)]
pub struct ClassifierSettings {
    pub endpoint: Url,
    pub model: String,
    pub api_token: Option<String>,
}

impl fmt::Debug for ClassifierSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierSettings")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// SMTP delivery settings for fake news alerts.
#[derive(Clone)]
pub struct AlertSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub receiver: String,
}

impl fmt::Debug for AlertSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("receiver", &self.receiver)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    /// `None` when no alert credentials were configured.
    pub alerts: Option<AlertSettings>,
    pub export_path: PathBuf,
}

impl Settings {
    /// Load the config file named by the CLI (if any) and merge it with the flags.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI/env values over file values over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let endpoint = cli
            .endpoint
            .clone()
            .or(file.classifier.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&endpoint).map_err(|source| ConfigError::Endpoint {
            endpoint: endpoint.clone(),
            source,
        })?;

        let classifier = ClassifierSettings {
            endpoint,
            model: cli
                .model
                .clone()
                .or(file.classifier.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_token: cli.api_token.clone().or(file.classifier.api_token),
        };

        let sender = cli.alert_sender.clone().or(file.alerts.sender);
        let password = cli.alert_password.clone().or(file.alerts.password);
        let receiver = cli.alert_receiver.clone().or(file.alerts.receiver);

        let alerts = match (sender, password, receiver) {
            (None, None, None) => None,
            (Some(sender), Some(password), Some(receiver)) => Some(AlertSettings {
                smtp_host: cli
                    .smtp_host
                    .clone()
                    .or(file.alerts.smtp_host)
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port: cli
                    .smtp_port
                    .or(file.alerts.smtp_port)
                    .unwrap_or(DEFAULT_SMTP_PORT),
                sender,
                password,
                receiver,
            }),
            (sender, password, receiver) => {
                let missing = [
                    ("sender", sender.is_none()),
                    ("password", password.is_none()),
                    ("receiver", receiver.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(ConfigError::IncompleteAlerts(missing));
            }
        };

        let export_path = cli
            .export_path
            .clone()
            .or(file.export_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));

        Ok(Settings {
            classifier,
            alerts,
            export_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_alerts() {
        let settings = Settings::resolve(&Cli::default(), FileConfig::default()).unwrap();
        assert_eq!(settings.classifier.endpoint.as_str(), "https://api-inference.huggingface.co/");
        assert_eq!(settings.classifier.model, DEFAULT_MODEL);
        assert!(settings.classifier.api_token.is_none());
        assert!(settings.alerts.is_none());
        assert_eq!(settings.export_path, PathBuf::from("log.csv"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli {
            model: Some("cli-model".to_string()),
            ..Cli::default()
        };
        let file: FileConfig = serde_yaml::from_str(
            "classifier:\n  model: file-model\n  endpoint: http://localhost:9000\nexport_path: out.csv\n",
        )
        .unwrap();

        let settings = Settings::resolve(&cli, file).unwrap();
        assert_eq!(settings.classifier.model, "cli-model");
        assert_eq!(settings.classifier.endpoint.as_str(), "http://localhost:9000/");
        assert_eq!(settings.export_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_complete_alerts_enabled() {
        let cli = Cli {
            alert_sender: Some("me@example.com".to_string()),
            alert_password: Some("s3cret".to_string()),
            alert_receiver: Some("admin@example.com".to_string()),
            ..Cli::default()
        };
        let alerts = Settings::resolve(&cli, FileConfig::default())
            .unwrap()
            .alerts
            .unwrap();
        assert_eq!(alerts.smtp_host, "smtp.gmail.com");
        assert_eq!(alerts.smtp_port, 465);
        assert_eq!(alerts.receiver, "admin@example.com");
        assert!(!format!("{alerts:?}").contains("s3cret"));
    }

    #[test]
    fn test_partial_alerts_rejected() {
        let cli = Cli {
            alert_sender: Some("me@example.com".to_string()),
            ..Cli::default()
        };
        let err = Settings::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteAlerts(ref m) if m == &["password", "receiver"]));
        assert_eq!(
            err.to_string(),
            "alert settings incomplete, missing: password, receiver"
        );
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let cli = Cli {
            endpoint: Some("not a url".to_string()),
            ..Cli::default()
        };
        let err = Settings::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Endpoint { .. }));
    }

    #[test]
    fn test_load_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "alerts:\n  sender: a@example.com\n  password: pw\n  receiver: b@example.com\n  smtp_port: 2465"
        )
        .unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Cli::default()
        };
        let alerts = Settings::load(&cli).unwrap().alerts.unwrap();
        assert_eq!(alerts.sender, "a@example.com");
        assert_eq!(alerts.smtp_port, 2465);
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "exprt_path: typo.csv").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

//! # TruthLens
//!
//! Check whether a headline or article is potentially real or fake news,
//! straight from the terminal.
//!
//! ## Features
//!
//! - Zero-shot classification ("real news" vs "fake news") through a
//!   Hugging Face style inference API, model loaded lazily on first use
//! - Trending keywords across everything checked in the session
//! - Feedback and 1-5 ratings with usage stats
//! - Email alert when fake news is detected with more than 90% confidence
//! - CSV export of the session log
//!
//! ## Usage
//!
//! ```sh
//! HF_API_TOKEN=hf_xxx truthlens
//! > check Aliens landed in Ohio yesterday
//! Prediction: FAKE NEWS (95.50% confidence)
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: flags and environment over an optional YAML file
//! 2. **Check**: validate, classify, record in the session log, alert if needed
//! 3. **Reports**: trending keywords, stats and history read the session log
//! 4. **Export**: the session log is written to `log.csv` on request

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod alert;
mod app;
mod classifier;
mod cli;
mod config;
mod keywords;
mod models;
mod outputs;
mod repl;
mod session;
mod utils;

use alert::{AlertNotifier, SmtpAlertTransport};
use app::App;
use classifier::{ClassificationInvoker, HttpModelLoader};
use cli::Cli;
use config::Settings;
use session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("truthlens starting up");

    let args = Cli::parse();
    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(?settings, "Resolved settings");

    let notifier = match &settings.alerts {
        Some(alerts) => {
            let transport = SmtpAlertTransport::from_settings(alerts)?;
            info!(smtp_host = %alerts.smtp_host, smtp_port = alerts.smtp_port, "Email alerts enabled");
            AlertNotifier::new(transport)
        }
        None => {
            warn!("No alert credentials configured; email alerts are disabled");
            AlertNotifier::disabled()
        }
    };

    let classifier = ClassificationInvoker::new(HttpModelLoader::new(settings.classifier.clone()));
    let app = App::new(classifier, notifier);
    let mut session = Session::new();

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    repl::run(&app, &mut session, &settings.export_path, stdin, stdout).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        total_checks = session.total_checks(),
        "Execution complete"
    );

    Ok(())
}

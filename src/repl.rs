//! Interactive terminal session.
//!
//! One run of the loop is one session: the [`Session`] it drives starts
//! empty and is dropped when the user quits or input ends. A failing
//! command prints a message and the loop carries on.

use crate::alert::AlertTransport;
use crate::app::{App, CheckError};
use crate::classifier::ModelLoader;
use crate::keywords::TRENDING_LIMIT;
use crate::models::{Rating, RatingOutOfRange};
use crate::outputs::{export, report};
use crate::session::Session;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{error, info};

pub const HELP: &str = "\
Commands:
  check <text>      classify a headline or article
  check             classify multi-line text, end with an empty line
  feedback <text>   leave a suggestion
  rate <1-5>        rate this tool
  stats             usage numbers
  trending          trending keywords
  history           recent predictions
  export [path]     save the session log as CSV
  help              this message
  quit              end the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `None` means the text follows on the next lines.
    Check(Option<String>),
    Feedback(String),
    Rate(Rating),
    Stats,
    Trending,
    History,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    #[error("`rate` needs a number between 1 and 5")]
    MissingRating,
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error(transparent)]
    Rating(#[from] RatingOutOfRange),
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let rest = (!rest.is_empty()).then(|| rest.to_string());

        let command = match word.to_lowercase().as_str() {
            "check" => Command::Check(rest),
            "feedback" => Command::Feedback(rest.unwrap_or_default()),
            "rate" => {
                let raw = rest.ok_or(CommandError::MissingRating)?;
                let value: i64 = raw.parse().map_err(|_| CommandError::NotANumber(raw.clone()))?;
                Command::Rate(Rating::try_from(value)?)
            }
            "stats" => Command::Stats,
            "trending" => Command::Trending,
            "history" => Command::History,
            "export" => Command::Export(rest.map(PathBuf::from)),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Read lines until an empty line or end of input and join them.
async fn read_block<R>(lines: &mut Lines<R>) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut block = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        block.push(line);
    }
    Ok(block.join("\n"))
}

async fn check<L, T>(app: &App<L, T>, session: &mut Session, text: &str) -> String
where
    L: ModelLoader,
    T: AlertTransport,
{
    match app.check(session, text).await {
        Ok(outcome) => {
            let mut out = report::prediction(&outcome.record);
            if let Some(alert) = &outcome.alert {
                out.push_str(&report::alert_outcome(alert));
            }
            out
        }
        Err(CheckError::EmptyInput) => "Warning: please enter some text.\n".to_string(),
        Err(e) => {
            error!(error = %e, "Check failed");
            format!("Error: {e}\n")
        }
    }
}

/// Run an interactive session until `quit` or end of input.
pub async fn run<L, T, R, W>(
    app: &App<L, T>,
    session: &mut Session,
    default_export_path: &Path,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    L: ModelLoader,
    T: AlertTransport,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output
        .write_all(b"TruthLens: check if a headline or article is potentially real or fake.\n")
        .await?;
    output.write_all(b"Type `help` for commands.\n").await?;
    let alerts: &[u8] = if app.alerts_enabled() {
        b"Email alerts: on\n"
    } else {
        b"Email alerts: off (no credentials configured)\n"
    };
    output.write_all(alerts).await?;

    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                output.write_all(format!("{e}\n").as_bytes()).await?;
                continue;
            }
        };

        let response = match command {
            Command::Check(text) => {
                let text = match text {
                    Some(text) => text,
                    None => {
                        output
                            .write_all(b"Enter text, finish with an empty line:\n")
                            .await?;
                        output.flush().await?;
                        read_block(&mut lines).await?
                    }
                };
                if !app.classifier_loaded() && !text.trim().is_empty() {
                    output.write_all(b"Loading AI model, please wait...\n").await?;
                    output.flush().await?;
                }
                check(app, session, &text).await
            }
            Command::Feedback(text) => {
                session.add_feedback(text);
                "Thank you for your feedback!\n".to_string()
            }
            Command::Rate(rating) => {
                session.add_rating(rating);
                "Thanks for rating us!\n".to_string()
            }
            Command::Stats => report::stats(&session.stats()),
            Command::Trending => report::trending(&session.trending(TRENDING_LIMIT)),
            Command::History => report::history(session.log()),
            Command::Export(path) => {
                let path = path.as_deref().unwrap_or(default_export_path);
                match export::export_csv(session.log(), path).await {
                    Ok(n) => format!("Saved {n} predictions to {}\n", path.display()),
                    Err(e) => format!("Error: {e}\n"),
                }
            }
            Command::Help => HELP.to_string(),
            Command::Quit => break,
        };
        output.write_all(response.as_bytes()).await?;
    }

    output.flush().await?;
    info!(
        total_checks = session.total_checks(),
        ratings = session.ratings().len(),
        feedback = session.feedback().len(),
        "Session ended"
    );
    Ok(())
}

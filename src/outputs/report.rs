//! Plain-text rendering of results and session reports for the terminal.

use crate::alert::AlertOutcome;
use crate::keywords::KeywordCount;
use crate::models::ClassificationRecord;
use crate::session::{SessionLog, UsageStats};
use crate::utils::{preview, upcase};
use std::fmt::Write;

/// How many past predictions the history view shows.
pub const HISTORY_LEN: usize = 5;

/// Characters of text shown per history entry.
pub const HISTORY_PREVIEW_CHARS: usize = 100;

pub fn prediction(record: &ClassificationRecord) -> String {
    format!(
        "Prediction: {} ({:.2}% confidence)\n",
        record.label.as_str().to_uppercase(),
        record.confidence
    )
}

pub fn alert_outcome(outcome: &AlertOutcome) -> String {
    match outcome {
        AlertOutcome::Sent => "Alert sent: high-confidence fake news reported.\n".to_string(),
        AlertOutcome::Failed(reason) => format!("Warning: email alert failed: {reason}\n"),
        AlertOutcome::Disabled => {
            "High-confidence fake news (alerts are not configured).\n".to_string()
        }
    }
}

pub fn trending(keywords: &[KeywordCount]) -> String {
    let mut out = String::from("Trending keywords\n");
    for k in keywords {
        let _ = writeln!(out, "  {} ({})", upcase(&k.word), k.count);
    }
    out
}

pub fn stats(stats: &UsageStats) -> String {
    let mut out = String::from("Usage\n");
    let _ = writeln!(out, "  Total checks: {}", stats.total_checks);
    match stats.average_rating {
        Some(avg) => {
            let _ = writeln!(out, "  Average rating: {avg:.2}");
        }
        None => out.push_str("  No ratings yet.\n"),
    }
    let _ = writeln!(out, "  Feedback received: {}", stats.feedback_count);
    out
}

/// The most recent predictions, newest first.
pub fn history(log: &SessionLog) -> String {
    if log.is_empty() {
        return "No predictions yet.\n".to_string();
    }
    let mut out = String::from("Past predictions\n");
    for record in log.recent(HISTORY_LEN) {
        let _ = writeln!(
            out,
            "  [{}] {}\n      {} | {:.2}%",
            record.checked_at.format("%H:%M:%S"),
            preview(&record.text, HISTORY_PREVIEW_CHARS),
            record.label,
            record.confidence
        );
    }
    out
}

//! CSV export of the session log.
//!
//! # Output Format
//!
//! ```text
//! text,label,confidence
//! Aliens landed in Ohio yesterday,fake news,95.5
//! "Rates rise, markets dip",real news,71.23
//! ```
//!
//! The file is rebuilt from scratch on every export; an empty log still
//! gets the header row.

use crate::models::{ClassificationRecord, Label};
use crate::session::SessionLog;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument};

pub const CSV_HEADER: [&str; 3] = ["text", "label", "confidence"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// One exported row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub text: String,
    pub label: Label,
    pub confidence: f64,
}

impl From<&ClassificationRecord> for LogRow {
    fn from(record: &ClassificationRecord) -> Self {
        Self {
            text: record.text.clone(),
            label: record.label,
            confidence: record.confidence,
        }
    }
}

/// Encode the log as CSV bytes, header first, oldest record first.
pub fn encode_log(log: &SessionLog) -> Result<Vec<u8>, ExportError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for record in log.records() {
        wtr.serialize(LogRow::from(record))?;
    }
    wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))
}

/// Write the session log to `path`, replacing any existing file.
///
/// Returns the number of records written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn export_csv(log: &SessionLog, path: &Path) -> Result<usize, ExportError> {
    let bytes = encode_log(log)?;
    if let Err(source) = fs::write(path, bytes).await {
        error!(error = %source, "Failed to write session log");
        return Err(ExportError::Write {
            path: path.display().to_string(),
            source,
        });
    }
    info!(records = log.len(), "Wrote session log CSV");
    Ok(log.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prediction;

    fn log_of(rows: &[(&str, Label, f64)]) -> SessionLog {
        let mut log = SessionLog::default();
        for &(text, label, confidence) in rows {
            log.push(ClassificationRecord::new(text, Prediction { label, confidence }));
        }
        log
    }

    #[test]
    fn test_empty_log_has_header_only() {
        let bytes = encode_log(&SessionLog::default()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "text,label,confidence\n");
    }

    #[test]
    fn test_encode_quotes_commas_and_newlines() {
        let log = log_of(&[
            ("Rates rise, markets dip", Label::Real, 71.234),
            ("Line one\nline \"two\"", Label::Fake, 95.5),
        ]);
        let csv = String::from_utf8(encode_log(&log).unwrap()).unwrap();
        assert_eq!(
            csv,
            "text,label,confidence\n\
             \"Rates rise, markets dip\",real news,71.23\n\
             \"Line one\nline \"\"two\"\"\",fake news,95.5\n"
        );
    }

    #[tokio::test]
    async fn test_export_round_trip() {
        let log = log_of(&[
            ("Aliens landed in Ohio yesterday", Label::Fake, 95.5),
            ("Central bank holds rates, again", Label::Real, 88.8765),
            ("Über-große Änderung 🚀", Label::Real, 50.0),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");

        let written = export_csv(&log, &path).await.unwrap();
        assert_eq!(written, 3);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(rdr.headers().unwrap(), &csv::StringRecord::from(CSV_HEADER.to_vec()));
        let rows: Vec<LogRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), log.len());
        for (row, record) in rows.iter().zip(log.records()) {
            assert_eq!(row.text, record.text);
            assert_eq!(row.label, record.label);
            assert_eq!(format!("{:.2}", row.confidence), format!("{:.2}", record.confidence));
        }
    }

    #[tokio::test]
    async fn test_export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "stale,data\n1,2\n3,4\n5,6\n").unwrap();

        export_csv(&log_of(&[("Fresh", Label::Real, 60.0)]), &path)
            .await
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "text,label,confidence\nFresh,real news,60.0\n");
    }

    #[tokio::test]
    async fn test_export_failure_leaves_log_untouched() {
        let log = log_of(&[("Kept", Label::Fake, 91.0)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.csv");

        let err = export_csv(&log, &path).await.unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].text, "Kept");
    }
}

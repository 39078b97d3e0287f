//! Per-session state: the classification log, feedback and ratings.
//!
//! A [`Session`] lives exactly as long as one interactive run and is handed
//! to request handlers by `&mut`. Nothing in here is shared between sessions.

use crate::keywords::{self, KeywordCount};
use crate::models::{ClassificationRecord, Rating};
use tracing::debug;

/// Append-only, chronologically ordered classification history.
#[derive(Debug, Default)]
pub struct SessionLog {
    records: Vec<ClassificationRecord>,
}

impl SessionLog {
    pub fn push(&mut self, record: ClassificationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ClassificationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` records, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ClassificationRecord> {
        self.records.iter().rev().take(n)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text.as_str())
    }
}

/// Snapshot of the usage numbers shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageStats {
    pub total_checks: usize,
    /// `None` until the first rating arrives.
    pub average_rating: Option<f64>,
    pub feedback_count: usize,
}

#[derive(Debug, Default)]
pub struct Session {
    log: SessionLog,
    feedback: Vec<String>,
    ratings: Vec<Rating>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn record(&mut self, record: ClassificationRecord) {
        debug!(label = %record.label, confidence = record.confidence, "Appending to session log");
        self.log.push(record);
    }

    pub fn add_feedback(&mut self, feedback: impl Into<String>) {
        self.feedback.push(feedback.into());
    }

    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    pub fn add_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn total_checks(&self) -> usize {
        self.log.len()
    }

    /// Mean of all ratings, or `None` when nobody has rated yet.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.iter().map(|r| r.value() as u32).sum();
        Some(sum as f64 / self.ratings.len() as f64)
    }

    pub fn stats(&self) -> UsageStats {
        UsageStats {
            total_checks: self.total_checks(),
            average_rating: self.average_rating(),
            feedback_count: self.feedback.len(),
        }
    }

    /// Most frequent keywords over every checked text plus the standing topics.
    pub fn trending(&self, limit: usize) -> Vec<KeywordCount> {
        keywords::trending(self.log.texts(), limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Label, Prediction};

    fn record(text: &str, label: Label, confidence: f64) -> ClassificationRecord {
        ClassificationRecord::new(text, Prediction { label, confidence })
    }

    #[test]
    fn test_average_rating_empty_is_none() {
        let session = Session::new();
        assert_eq!(session.average_rating(), None);
        assert_eq!(session.stats().average_rating, None);
    }

    #[test]
    fn test_average_rating_mean() {
        let mut session = Session::new();
        session.add_rating(Rating::try_from(3).unwrap());
        session.add_rating(Rating::try_from(5).unwrap());
        assert_eq!(session.average_rating(), Some(4.0));
        assert_eq!(format!("{:.2}", session.average_rating().unwrap()), "4.00");
    }

    #[test]
    fn test_log_keeps_insertion_order() {
        let mut session = Session::new();
        session.record(record("first", Label::Real, 80.0));
        session.record(record("second", Label::Fake, 70.0));
        session.record(record("third", Label::Real, 60.0));

        let texts: Vec<&str> = session.log().texts().collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(session.total_checks(), 3);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut session = Session::new();
        for i in 0..7 {
            session.record(record(&format!("text {i}"), Label::Real, 50.0));
        }
        let recent: Vec<&str> = session.log().recent(5).map(|r| r.text.as_str()).collect();
        assert_eq!(recent, vec!["text 6", "text 5", "text 4", "text 3", "text 2"]);
    }

    #[test]
    fn test_feedback_and_stats() {
        let mut session = Session::new();
        session.add_feedback("Great tool");
        session.add_feedback("");
        session.record(record("Economy grows", Label::Real, 99.0));

        let stats = session.stats();
        assert_eq!(stats.total_checks, 1);
        assert_eq!(stats.feedback_count, 2);
        assert_eq!(session.feedback()[0], "Great tool");
    }

    #[test]
    fn test_trending_uses_log_text() {
        let mut session = Session::new();
        session.record(record("Climate summit climate deal", Label::Real, 77.0));
        let top = session.trending(3);
        assert_eq!(top[0].word, "climate");
        assert_eq!(top[0].count, 3);
    }
}

//! Data models for classification results and session feedback.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Label`]: The two candidate labels offered to the zero-shot classifier
//! - [`Prediction`]: The classifier's answer for one piece of text
//! - [`ClassificationRecord`]: A prediction as stored in the session log
//! - [`Rating`]: A validated 1-5 user rating

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The verdict for a piece of text.
///
/// Serializes as the exact candidate label sent to the classifier
/// (`"real news"` / `"fake news"`), which is also what lands in `log.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "real news")]
    Real,
    #[serde(rename = "fake news")]
    Fake,
}

impl Label {
    /// Candidate labels in the order they are offered to the classifier.
    pub const CANDIDATES: [Label; 2] = [Label::Real, Label::Fake];

    /// The candidate label text understood by the classifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "real news",
            Label::Fake => "fake news",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a classifier answers with a label we never offered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown label `{0}`")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "real news" => Ok(Label::Real),
            "fake news" => Ok(Label::Fake),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// A classifier verdict before it is recorded.
///
/// `confidence` is the top label's probability as a percentage and always
/// lies in `[0, 100]`; [`crate::classifier`] rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    pub confidence: f64,
}

/// One successful check, as kept in the session log.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRecord {
    /// The text exactly as the user submitted it.
    pub text: String,
    pub label: Label,
    /// Confidence percentage rounded to two decimals.
    pub confidence: f64,
    /// When the check completed. Display only, never exported.
    pub checked_at: DateTime<Local>,
}

impl ClassificationRecord {
    pub fn new(text: impl Into<String>, prediction: Prediction) -> Self {
        Self {
            text: text.into(),
            label: prediction.label,
            confidence: round2(prediction.confidence),
            checked_at: Local::now(),
        }
    }
}

/// Round a percentage to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A user rating of the tool, always between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {0}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingOutOfRange(pub i64);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(RatingOutOfRange(value))
        }
    }
}

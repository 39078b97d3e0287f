//! The check flow: validate, classify, record, maybe alert.
//!
//! [`App`] holds the process-wide pieces (classifier handle and alert
//! notifier). Per-user state stays in the [`Session`] passed to each call.

use crate::alert::{self, AlertNotifier, AlertOutcome, AlertTransport};
use crate::classifier::{ClassificationInvoker, ClassifyError, ModelLoader};
use crate::models::{ClassificationRecord, Prediction};
use crate::session::Session;
use crate::utils::truncate_for_log;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("please enter some text")]
    EmptyInput,
    #[error(transparent)]
    Classifier(#[from] ClassifyError),
}

/// Result of one successful check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub record: ClassificationRecord,
    /// Set only when the alert policy fired.
    pub alert: Option<AlertOutcome>,
}

pub struct App<L: ModelLoader, T> {
    classifier: ClassificationInvoker<L>,
    notifier: AlertNotifier<T>,
}

impl<L: ModelLoader, T: AlertTransport> App<L, T> {
    pub fn new(classifier: ClassificationInvoker<L>, notifier: AlertNotifier<T>) -> Self {
        Self {
            classifier,
            notifier,
        }
    }

    pub fn alerts_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    /// Whether the model handle has been obtained yet.
    pub fn classifier_loaded(&self) -> bool {
        self.classifier.is_loaded()
    }

    /// Classify `text`, append it to the session log and alert on confident fakes.
    ///
    /// Blank input is rejected before the classifier is touched. A classifier
    /// failure leaves the session untouched. Alert failures are reported in
    /// the outcome and never undo the recorded check.
    #[instrument(level = "info", skip_all, fields(text = %truncate_for_log(text, 60)))]
    pub async fn check(&self, session: &mut Session, text: &str) -> Result<CheckOutcome, CheckError> {
        if text.trim().is_empty() {
            warn!("Rejected empty input");
            return Err(CheckError::EmptyInput);
        }

        let prediction: Prediction = self.classifier.classify(text).await?;
        let record = ClassificationRecord::new(text, prediction);
        session.record(record.clone());

        let alert = if alert::should_alert(&prediction) {
            let message = alert::compose_alert(text, prediction.confidence);
            Some(self.notifier.notify(&message).await)
        } else {
            None
        };

        info!(
            label = %record.label,
            confidence = record.confidence,
            total_checks = session.total_checks(),
            alerted = alert.is_some(),
            "Check complete"
        );
        Ok(CheckOutcome { record, alert })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::tests::RecordingTransport;
    use crate::classifier::tests::FixedLoader;
    use crate::models::Label;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn app(label: &str, score: f64, transport: RecordingTransport) -> App<FixedLoader, RecordingTransport> {
        App::new(
            ClassificationInvoker::new(FixedLoader::ranked(label, score)),
            AlertNotifier::new(transport),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_fake_news_alert() {
        let transport = RecordingTransport::default();
        let sent = Arc::clone(&transport.sent);
        let app = app("fake news", 0.955, transport);
        let mut session = Session::new();
        let before = session.total_checks();

        let outcome = app
            .check(&mut session, "Aliens landed in Ohio yesterday")
            .await
            .unwrap();

        assert_eq!(outcome.record.label, Label::Fake);
        assert_eq!(outcome.record.confidence, 95.5);
        assert_eq!(outcome.alert, Some(AlertOutcome::Sent));
        assert_eq!(session.total_checks(), before + 1);
        assert_eq!(session.log().records()[0].text, "Aliens landed in Ohio yesterday");

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Text: Aliens landed in Ohio yesterday"));
        assert!(sent[0].1.contains("Confidence: 95.50%"));
    }

    #[tokio::test]
    async fn test_fake_below_threshold_does_not_alert() {
        let transport = RecordingTransport::default();
        let sent = Arc::clone(&transport.sent);
        let app = app("fake news", 0.85, transport);
        let mut session = Session::new();

        let outcome = app.check(&mut session, "Borderline claim").await.unwrap();
        assert_eq!(outcome.alert, None);
        assert!(sent.lock().unwrap().is_empty());
        assert_eq!(session.total_checks(), 1);
    }

    #[tokio::test]
    async fn test_real_news_never_alerts() {
        let transport = RecordingTransport::default();
        let sent = Arc::clone(&transport.sent);
        let app = app("real news", 0.99, transport);
        let mut session = Session::new();

        let outcome = app.check(&mut session, "Parliament passes budget").await.unwrap();
        assert_eq!(outcome.alert, None);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_skips_classifier() {
        let loader = FixedLoader::ranked("fake news", 0.99);
        let loads = Arc::clone(&loader.loads);
        let app = App::new(
            ClassificationInvoker::new(loader),
            AlertNotifier::new(RecordingTransport::default()),
        );
        let mut session = Session::new();

        for blank in ["", "   ", "\n\t "] {
            let err = app.check(&mut session, blank).await.unwrap_err();
            assert!(matches!(err, CheckError::EmptyInput));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert_eq!(session.total_checks(), 0);
    }

    #[tokio::test]
    async fn test_alert_failure_keeps_record() {
        let app = app(
            "fake news",
            0.97,
            RecordingTransport {
                fail: true,
                ..RecordingTransport::default()
            },
        );
        let mut session = Session::new();

        let outcome = app.check(&mut session, "Moon made of cheese").await.unwrap();
        assert!(matches!(outcome.alert, Some(AlertOutcome::Failed(_))));
        assert_eq!(session.total_checks(), 1);
    }

    #[tokio::test]
    async fn test_classifier_failure_leaves_session_untouched() {
        let app = App::new(
            ClassificationInvoker::new(FixedLoader::ranked("fake news", 0.99).failing_first(1)),
            AlertNotifier::new(RecordingTransport::default()),
        );
        let mut session = Session::new();

        let err = app.check(&mut session, "Anything").await.unwrap_err();
        assert!(matches!(err, CheckError::Classifier(_)));
        assert_eq!(session.total_checks(), 0);
    }

    #[tokio::test]
    async fn test_disabled_alerts_report_disabled() {
        let app: App<FixedLoader, RecordingTransport> = App::new(
            ClassificationInvoker::new(FixedLoader::ranked("fake news", 0.99)),
            AlertNotifier::disabled(),
        );
        assert!(!app.alerts_enabled());
        let mut session = Session::new();
        assert!(!app.classifier_loaded());
        let outcome = app.check(&mut session, "Flat earth confirmed").await.unwrap();
        assert_eq!(outcome.alert, Some(AlertOutcome::Disabled));
        assert!(app.classifier_loaded());
    }
}

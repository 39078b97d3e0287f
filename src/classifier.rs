//! Zero-shot "real news" / "fake news" classification.
//!
//! The model itself lives behind an inference service; this module only
//! knows how to reach it and how to read its answer.
//!
//! # Architecture
//!
//! - [`ZeroShot`]: Core trait, one text plus candidate labels in, ranked labels out
//! - [`ModelLoader`]: Produces a [`ZeroShot`] handle (slow, done once)
//! - [`HttpModelLoader`] / [`HttpZeroShot`]: Hugging Face style inference API backend
//! - [`ClassificationInvoker`]: Lazily loads the model exactly once and turns
//!   raw output into a validated [`Prediction`]
//!
//! # Initialization
//!
//! The model handle is created on the first call to
//! [`ClassificationInvoker::classify`]. Concurrent first calls wait on the
//! same initialization instead of loading twice. A failed load leaves the
//! handle empty so the next request tries again.

use crate::config::ClassifierSettings;
use crate::models::{Label, Prediction};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("classifier unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },
    #[error("malformed classifier response: {0}")]
    Malformed(String),
    #[error("invalid model URL: {0}")]
    ModelUrl(#[from] url::ParseError),
}

/// Ranked output of a zero-shot model, best label first.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroShotOutput {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// A loaded zero-shot classification model.
pub trait ZeroShot {
    /// Score `text` against each candidate label.
    async fn zero_shot(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotOutput, ClassifyError>;
}

/// Creates the model handle. Called at most once per successful load.
pub trait ModelLoader {
    type Model: ZeroShot;

    async fn load(&self) -> Result<Self::Model, ClassifyError>;
}

/// Process-wide classifier with a lazily initialized model handle.
pub struct ClassificationInvoker<L: ModelLoader> {
    loader: L,
    model: OnceCell<L::Model>,
}

impl<L: ModelLoader> ClassificationInvoker<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<&L::Model, ClassifyError> {
        self.model
            .get_or_try_init(|| async {
                info!("Loading zero-shot model, this can take a while");
                let t0 = Instant::now();
                let res = self.loader.load().await;
                match &res {
                    Ok(_) => info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Model ready"),
                    Err(e) => warn!(error = %e, "Model failed to load"),
                }
                res
            })
            .await
    }

    /// Classify non-empty text as real or fake news.
    ///
    /// Callers are expected to reject blank input before getting here.
    #[instrument(level = "info", skip_all, fields(chars = text.chars().count()))]
    pub async fn classify(&self, text: &str) -> Result<Prediction, ClassifyError> {
        let model = self.model().await?;
        let candidates = Label::CANDIDATES.map(|l| l.as_str());

        let t0 = Instant::now();
        let output = model.zero_shot(text, &candidates).await?;
        let prediction = prediction_from_output(&output)?;
        info!(
            label = %prediction.label,
            confidence = prediction.confidence,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Classified text"
        );
        Ok(prediction)
    }
}

/// Take the top-ranked label and turn its probability into a percentage.
pub fn prediction_from_output(output: &ZeroShotOutput) -> Result<Prediction, ClassifyError> {
    if output.labels.len() != output.scores.len() {
        return Err(ClassifyError::Malformed(format!(
            "{} labels but {} scores",
            output.labels.len(),
            output.scores.len()
        )));
    }
    let (Some(top_label), Some(&top_score)) = (output.labels.first(), output.scores.first()) else {
        return Err(ClassifyError::Malformed("no labels returned".to_string()));
    };

    let label = top_label
        .parse::<Label>()
        .map_err(|e| ClassifyError::Malformed(e.to_string()))?;

    if !(0.0..=1.0).contains(&top_score) {
        return Err(ClassifyError::Malformed(format!(
            "score {top_score} outside [0, 1]"
        )));
    }

    Ok(Prediction {
        label,
        confidence: top_score * 100.0,
    })
}

/// Loader for a model served by a Hugging Face style inference API.
#[derive(Debug, Clone)]
pub struct HttpModelLoader {
    settings: ClassifierSettings,
}

impl HttpModelLoader {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }
}

impl ModelLoader for HttpModelLoader {
    type Model = HttpZeroShot;

    #[instrument(level = "info", skip_all, fields(model = %self.settings.model))]
    async fn load(&self) -> Result<Self::Model, ClassifyError> {
        let url = model_url(&self.settings.endpoint, &self.settings.model)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("truthlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        info!(%url, "Inference client ready");
        Ok(HttpZeroShot {
            client,
            url,
            api_token: self.settings.api_token.clone(),
        })
    }
}

/// `{endpoint}/models/{model}`, keeping any path prefix on the endpoint.
pub fn model_url(endpoint: &Url, model: &str) -> Result<Url, url::ParseError> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("models/{}", model.trim_matches('/')))
}

#[derive(Debug)]
pub struct HttpZeroShot {
    client: reqwest::Client,
    url: Url,
    api_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// The inference API has answered in both of these shapes over time.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Ranked {
        labels: Vec<String>,
        scores: Vec<f64>,
    },
    Pairs(Vec<LabelScore>),
    Error {
        error: String,
    },
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl ZeroShotResponse {
    fn into_output(self) -> Result<ZeroShotOutput, ClassifyError> {
        match self {
            ZeroShotResponse::Ranked { labels, scores } => Ok(ZeroShotOutput { labels, scores }),
            ZeroShotResponse::Pairs(mut pairs) => {
                pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
                let (labels, scores) = pairs.into_iter().map(|p| (p.label, p.score)).unzip();
                Ok(ZeroShotOutput { labels, scores })
            }
            ZeroShotResponse::Error { error } => Err(ClassifyError::Unavailable {
                status: 200,
                message: error,
            }),
        }
    }
}

/// Parse a response body from the inference API.
fn parse_response(body: &str) -> Result<ZeroShotOutput, ClassifyError> {
    serde_json::from_str::<ZeroShotResponse>(body)
        .map_err(|e| ClassifyError::Malformed(e.to_string()))?
        .into_output()
}

impl ZeroShot for HttpZeroShot {
    #[instrument(level = "debug", skip_all, fields(url = %self.url))]
    async fn zero_shot(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<ZeroShotOutput, ClassifyError> {
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "Inference response");

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(text);
            return Err(ClassifyError::Unavailable {
                status: status.as_u16(),
                message,
            });
        }

        parse_response(&text)
    }
}

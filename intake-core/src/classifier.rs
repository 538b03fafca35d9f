//! Text classification for free-text answers
//!
//! Provides a `Classifier` trait with implementations for:
//! - **HTTP** — a hosted text-classification endpoint speaking the Hugging Face
//!   inference wire format (`{"inputs": "..."}` → label/score list)
//! - **ONNX** — a local sequence-classification model (see `onnx_classifier`)
//!
//! Failures are returned to the caller as-is. There is no fallback classifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ClassifierConfig;

/// Env var consulted when `classifier.api_token` is not set.
pub const TOKEN_ENV_VAR: &str = "INTAKE_CLASSIFIER_TOKEN";

// ============================================================================
// Classifier trait
// ============================================================================

/// Top prediction for one input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f32,
}

/// Abstraction over text-classification providers.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a single text and return the highest-scoring label.
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Classifier returned no predictions")]
    EmptyPrediction,

    #[error("ONNX model not found at {path}")]
    ModelNotFound { path: String },

    #[error("ONNX inference error: {0}")]
    OnnxInference(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Unknown classifier backend: {0}")]
    UnknownBackend(String),
}

/// Create the configured backend.
pub fn create_classifier(config: &ClassifierConfig) -> Result<Box<dyn Classifier>, ClassifierError> {
    match config.backend.as_str() {
        "http" => Ok(Box::new(HttpClassifier::new(config)?)),
        "onnx" => {
            let onnx = crate::onnx_classifier::OnnxConfig::from_model_path(&config.onnx_model);
            Ok(Box::new(crate::onnx_classifier::OnnxClassifier::new(onnx)?))
        }
        other => Err(ClassifierError::UnknownBackend(other.to_string())),
    }
}

/// Pick the highest-scoring prediction.
pub fn top_prediction(
    predictions: impl IntoIterator<Item = Classification>,
) -> Result<Classification, ClassifierError> {
    predictions
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or(ClassifierError::EmptyPrediction)
}

// ============================================================================
// Inference API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// The hosted pipeline answers with either a flat list of labels or a list
/// per input; a single input gives `[[...]]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<Classification>>),
    Flat(Vec<Classification>),
}

impl InferenceResponse {
    fn into_predictions(self) -> Vec<Classification> {
        match self {
            InferenceResponse::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(flat) => flat,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InferenceErrorResponse {
    error: Option<String>,
}

// ============================================================================
// HttpClassifier
// ============================================================================

/// Calls a hosted text-classification endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    url: String,
    api_token: Option<String>,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let api_token = config
            .api_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.is_empty());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_token,
        })
    }

    async fn classify_once(&self, text: &str) -> Result<Classification, ClassifierError> {
        let mut request = self.client.post(&self.url).json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<InferenceErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Classifier API error");

            return Err(ClassifierError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: InferenceResponse = response.json().await?;
        top_prediction(body.into_predictions())
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        self.classify_once(text).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(url: String, token: Option<&str>) -> ClassifierConfig {
        ClassifierConfig {
            backend: "http".to_string(),
            url,
            api_token: token.map(str::to_string),
            timeout_seconds: 5,
            onnx_model: String::new(),
            accept_label: "valid".to_string(),
        }
    }

    fn batched_response() -> serde_json::Value {
        serde_json::json!([[
            { "label": "invalid", "score": 0.12 },
            { "label": "valid", "score": 0.88 }
        ]])
    }

    #[tokio::test]
    async fn test_classify_posts_inputs_and_returns_top_label() {
        let mock_server = MockServer::start().await;
        let url = format!("{}/models/hiring-intent", mock_server.uri());
        let client = HttpClassifier::new(&test_config(url, Some("secret"))).unwrap();

        Mock::given(method("POST"))
            .and(path("/models/hiring-intent"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(serde_json::json!({ "inputs": "I love building data tools" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(batched_response()))
            .mount(&mock_server)
            .await;

        let result = client.classify("I love building data tools").await;

        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result.err());
        let top = result.unwrap();
        assert_eq!(top.label, "valid");
        assert!((top.score - 0.88).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_classify_accepts_flat_response() {
        let mock_server = MockServer::start().await;
        let client = HttpClassifier::new(&test_config(mock_server.uri(), None)).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "label": "invalid", "score": 0.7 },
                { "label": "valid", "score": 0.3 }
            ])))
            .mount(&mock_server)
            .await;

        let top = client.classify("asdf").await.unwrap();
        assert_eq!(top.label, "invalid");
    }

    #[tokio::test]
    async fn test_classify_returns_api_error_on_503() {
        let mock_server = MockServer::start().await;
        let client = HttpClassifier::new(&test_config(mock_server.uri(), None)).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Model is currently loading"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        match client.classify("hello").await {
            Err(ClassifierError::Api { code, message }) => {
                assert_eq!(code, 503);
                assert_eq!(message, "Model is currently loading");
            }
            other => panic!("Expected Api error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_classify_empty_prediction_list() {
        let mock_server = MockServer::start().await;
        let client = HttpClassifier::new(&test_config(mock_server.uri(), None)).unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[]])))
            .mount(&mock_server)
            .await;

        let result = client.classify("hello").await;
        assert!(matches!(result, Err(ClassifierError::EmptyPrediction)));
    }

    #[tokio::test]
    async fn test_classify_unreachable_server_is_http_error() {
        let client =
            HttpClassifier::new(&test_config("http://127.0.0.1:1".to_string(), None)).unwrap();
        let result = client.classify("hello").await;
        assert!(matches!(result, Err(ClassifierError::Http(_))));
    }

    #[test]
    fn test_top_prediction_picks_highest_score() {
        let top = top_prediction(vec![
            Classification { label: "a".to_string(), score: 0.2 },
            Classification { label: "b".to_string(), score: 0.5 },
            Classification { label: "c".to_string(), score: 0.3 },
        ])
        .unwrap();
        assert_eq!(top.label, "b");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let mut config = test_config("http://localhost".to_string(), None);
        config.backend = "gpt".to_string();
        match create_classifier(&config) {
            Err(ClassifierError::UnknownBackend(name)) => assert_eq!(name, "gpt"),
            Err(other) => panic!("Expected UnknownBackend, got: {other:?}"),
            Ok(_) => panic!("Expected UnknownBackend, got a classifier"),
        }
    }

    #[test]
    fn test_http_backend_from_factory() {
        let config = test_config("http://localhost".to_string(), None);
        let classifier = create_classifier(&config).unwrap();
        assert_eq!(classifier.name(), "http");
    }
}

//! ONNX classification backend — local inference for a fine-tuned DistilBERT
//! sequence classifier.
//!
//! Uses the `ort` crate for ONNX Runtime and `tokenizers` for WordPiece
//! tokenization. Expects the Hugging Face export layout: `model.onnx`,
//! `tokenizer.json` and `config.json` (for `id2label`) in one directory.

use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::classifier::{top_prediction, Classification, Classifier, ClassifierError};

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub labels_path: PathBuf,
}

impl OnnxConfig {
    /// Resolve the tokenizer and label map next to the model file.
    ///
    /// An empty path selects the default model directory.
    pub fn from_model_path(onnx_model_path: &str) -> Self {
        let model_path = if onnx_model_path.is_empty() {
            default_model_dir().join("model.onnx")
        } else {
            PathBuf::from(onnx_model_path)
        };
        let dir = model_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            tokenizer_path: dir.join("tokenizer.json"),
            labels_path: dir.join("config.json"),
            model_path,
        }
    }
}

/// Local ONNX sequence classifier.
pub struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<tokenizers::Tokenizer>,
    labels: Arc<Vec<String>>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load the model, tokenizer and label map.
    ///
    /// Returns `ClassifierError::ModelNotFound` if the model or tokenizer is
    /// missing. A missing `config.json` falls back to `LABEL_<n>` names.
    pub fn new(config: OnnxConfig) -> Result<Self, ClassifierError> {
        if !config.model_path.exists() {
            return Err(ClassifierError::ModelNotFound {
                path: config.model_path.display().to_string(),
            });
        }
        if !config.tokenizer_path.exists() {
            return Err(ClassifierError::ModelNotFound {
                path: config.tokenizer_path.display().to_string(),
            });
        }

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(&config.model_path))
            .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

        let tokenizer = tokenizers::Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;

        let labels = load_labels(&config.labels_path);
        tracing::info!(
            model = %config.model_path.display(),
            labels = ?labels,
            "Loaded ONNX classifier"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            labels: Arc::new(labels),
        })
    }
}

#[async_trait]
impl Classifier for OnnxClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        // CPU-bound; keep it off the async workers.
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let labels = Arc::clone(&self.labels);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let mut session_guard = session.lock().map_err(|e| {
                ClassifierError::OnnxInference(format!("session lock poisoned: {e}"))
            })?;
            let logits = logits_sync(&mut session_guard, &tokenizer, &text)?;
            top_prediction(predictions_from_logits(&logits, &labels))
        })
        .await
        .map_err(|e| ClassifierError::OnnxInference(format!("spawn_blocking join error: {e}")))?
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Run ONNX inference synchronously and return the raw logits for one input.
fn logits_sync(
    session: &mut Session,
    tokenizer: &tokenizers::Tokenizer,
    text: &str,
) -> Result<Vec<f32>, ClassifierError> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();

    let shape = vec![1i64, input_ids.len() as i64];

    let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids))
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

    // DistilBERT takes no token_type_ids.
    let inputs = ort::inputs! {
        "input_ids" => input_ids_tensor,
        "attention_mask" => attention_mask_tensor,
    };

    let outputs = session
        .run(inputs)
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

    let (out_shape, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| ClassifierError::OnnxInference(e.to_string()))?;

    // Expected shape: [1, num_labels]
    if out_shape.len() != 2 || out_shape[0] != 1 {
        return Err(ClassifierError::OnnxInference(format!(
            "Expected [1, num_labels] logits, got {:?}",
            &out_shape[..]
        )));
    }

    Ok(data.to_vec())
}

/// Softmax the logits and pair each probability with its label name.
pub fn predictions_from_logits(logits: &[f32], labels: &[String]) -> Vec<Classification> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.iter()
        .enumerate()
        .map(|(idx, &e)| Classification {
            label: labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("LABEL_{idx}")),
            score: if sum > 0.0 { e / sum } else { 0.0 },
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Read `id2label` from a Hugging Face `config.json`, ordered by class index.
pub fn load_labels(path: &Path) -> Vec<String> {
    let parsed = std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str::<ModelConfig>(&s).ok());

    let Some(model_config) = parsed else {
        tracing::warn!(path = %path.display(), "No label map found — using LABEL_<n> names");
        return Vec::new();
    };

    let mut indexed: Vec<(usize, String)> = model_config
        .id2label
        .into_iter()
        .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
        .collect();
    indexed.sort_by_key(|(idx, _)| *idx);

    let mut labels = Vec::new();
    for (idx, label) in indexed {
        while labels.len() < idx {
            labels.push(format!("LABEL_{}", labels.len()));
        }
        labels.push(label);
    }
    labels
}

/// Resolve the default model directory.
pub fn default_model_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local/share")
        });
    data_home.join("intake/models/hiring-intent")
}

// ============================================================================
// TESTS
// ============================================================================

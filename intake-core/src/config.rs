use config::{Config, File};
use serde::Deserialize;

use crate::error::IntakeError;
use crate::models::{default_questions, Question};

#[derive(Debug, Deserialize, Clone)]
pub struct IntakeConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default = "default_questions")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Tabular file completed sessions are appended to.
    pub output_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_path: "hiring_data.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierConfig {
    /// `http` or `onnx`
    pub backend: String,
    pub url: String,
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    /// Path to the exported `.onnx` model; tokenizer and label map sit beside it.
    pub onnx_model: String,
    /// Top label that counts as an acceptable free-text answer.
    pub accept_label: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            url: "https://api-inference.huggingface.co/models/dianapps-vaibhav/distilbert-hiring-intent"
                .to_string(),
            api_token: None,
            timeout_seconds: 30,
            onnx_model: String::new(),
            accept_label: "valid".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            storage: StorageConfig::default(),
            classifier: ClassifierConfig::default(),
            http: HttpConfig::default(),
            questions: default_questions(),
        }
    }
}

impl IntakeConfig {
    pub fn load(path: &str) -> Result<Self, IntakeError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;
        let config: Self = s.try_deserialize()?;
        if config.questions.is_empty() {
            return Err(IntakeError::NoQuestions);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = IntakeConfig::load("/nonexistent/intake").unwrap();
        assert_eq!(config.storage.output_path, "hiring_data.csv");
        assert_eq!(config.classifier.accept_label, "valid");
        assert_eq!(config.http.port, 8787);
        assert_eq!(config.questions.len(), 9);
    }

    #[test]
    fn test_load_custom_questions_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[storage]
output_path = "/tmp/out.csv"

[[questions]]
prompt = "Name?"
kind = "name"

[[questions]]
prompt = "Anything else?"
kind = "other"
"#
        )
        .unwrap();

        let config = IntakeConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.storage.output_path, "/tmp/out.csv");
        assert_eq!(config.questions.len(), 2);
        assert_eq!(config.questions[1].kind, FieldKind::Other);
        assert_eq!(config.classifier.backend, "http");
    }

    #[test]
    fn test_unknown_kind_in_config_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[questions]]
prompt = "Salary?"
kind = "salary"
"#
        )
        .unwrap();

        let result = IntakeConfig::load(file.path().to_str().unwrap());
        assert!(matches!(result, Err(IntakeError::Config(_))));
    }

    #[test]
    fn test_shipped_config_matches_builtin_questions() {
        let config = IntakeConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../intake.toml")).unwrap();
        assert_eq!(config.questions, default_questions());
        assert_eq!(config.classifier.backend, "http");
    }
}

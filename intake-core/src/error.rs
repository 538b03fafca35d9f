use thiserror::Error;

use crate::classifier::ClassifierError;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Classification unavailable: {0}")]
    Classification(#[from] ClassifierError),

    #[error("Unknown field kind: {0}")]
    UnknownFieldKind(String),

    #[error("Answer text is empty")]
    EmptyInput,

    #[error("All questions have been answered; retake to start over")]
    SessionComplete,

    #[error("Question list is empty")]
    NoQuestions,
}

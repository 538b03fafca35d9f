pub mod classifier;
pub mod config;
pub mod error;
pub mod interview;
pub mod models;
pub mod onnx_classifier;
pub mod persist;
pub mod sequencer;
pub mod session;
pub mod validator;

pub use classifier::{create_classifier, Classification, Classifier, ClassifierError, HttpClassifier};
pub use config::IntakeConfig;
pub use error::IntakeError;
pub use interview::{Interview, ViewModel};
pub use models::{FieldKind, Question, TranscriptEntry};
pub use onnx_classifier::OnnxClassifier;
pub use persist::{CsvRecordWriter, RecordWriter};
pub use sequencer::QuestionSequencer;
pub use session::{Answers, SessionState, SummaryEntry};

//! Per-session interview state: accepted answers, the transcript and the cursor.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::IntakeError;
use crate::models::{FieldKind, Question, TranscriptEntry};
use crate::sequencer::QuestionSequencer;

/// Accepted answers keyed by field kind, in the order they were accepted.
pub type Answers = IndexMap<FieldKind, String>;

/// One line of the final summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    answers: Answers,
    transcript: Vec<TranscriptEntry>,
    sequencer: QuestionSequencer,
}

impl SessionState {
    pub fn new(questions: impl Into<std::sync::Arc<[Question]>>) -> Result<Self, IntakeError> {
        Ok(Self {
            answers: Answers::new(),
            transcript: Vec::new(),
            sequencer: QuestionSequencer::new(questions)?,
        })
    }

    /// Store an accepted answer and acknowledge it in the transcript.
    /// Re-recording a kind overwrites the value but keeps its column position.
    pub fn record(&mut self, kind: FieldKind, answer: &str) {
        self.answers.insert(kind, answer.to_string());
        self.transcript.push(TranscriptEntry::accepted(answer));
    }

    /// Note a rejected answer. Answers and cursor are untouched.
    pub fn reject(&mut self, answer: &str) {
        self.transcript.push(TranscriptEntry::rejected(answer));
    }

    pub fn reset(&mut self) {
        self.answers.clear();
        self.transcript.clear();
        self.sequencer.reset();
    }

    pub fn current(&self) -> Option<&Question> {
        self.sequencer.current()
    }

    pub fn advance(&mut self) {
        self.sequencer.advance();
    }

    pub fn sequencer(&self) -> &QuestionSequencer {
        &self.sequencer
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn summary(&self) -> Vec<SummaryEntry> {
        self.answers
            .iter()
            .map(|(kind, value)| SummaryEntry {
                label: kind.display_label(),
                value: value.clone(),
            })
            .collect()
    }
}

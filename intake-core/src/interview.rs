//! Interview reducer: one user input in, one view out.
//!
//! `Interview` owns the session state for a single respondent. `submit` runs
//! the validate → record/reject → advance/persist pass synchronously and
//! returns the view to render. It does not depend on any UI.

use serde::Serialize;

use crate::classifier::Classifier;
use crate::error::IntakeError;
use crate::models::{FieldKind, Question, TranscriptEntry};
use crate::persist::RecordWriter;
use crate::session::{SessionState, SummaryEntry};
use crate::validator;

/// What the UI should render after an interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewModel {
    Asking {
        prompt: String,
        kind: FieldKind,
        /// Zero-based index of the question being asked.
        position: usize,
        total: usize,
        transcript: Vec<TranscriptEntry>,
    },
    Summary {
        entries: Vec<SummaryEntry>,
        /// False when writing the sheet failed.
        saved: bool,
        transcript: Vec<TranscriptEntry>,
    },
}

#[derive(Debug, Clone)]
pub struct Interview {
    state: SessionState,
    accept_label: String,
    saved: bool,
}

impl Interview {
    pub fn new(
        questions: impl Into<std::sync::Arc<[Question]>>,
        accept_label: impl Into<String>,
    ) -> Result<Self, IntakeError> {
        Ok(Self {
            state: SessionState::new(questions)?,
            accept_label: accept_label.into(),
            saved: false,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.sequencer().is_exhausted()
    }

    pub fn view(&self) -> ViewModel {
        let transcript = self.state.transcript().to_vec();
        match self.state.current() {
            Some(question) => ViewModel::Asking {
                prompt: question.prompt.clone(),
                kind: question.kind,
                position: self.state.sequencer().position(),
                total: self.state.sequencer().len(),
                transcript,
            },
            None => ViewModel::Summary {
                entries: self.state.summary(),
                saved: self.saved,
                transcript,
            },
        }
    }

    /// Handle one user input for the current question.
    ///
    /// On acceptance of the last answer the completed set is written once
    /// through `writer`. A classifier failure leaves the state untouched.
    pub async fn submit(
        &mut self,
        input: &str,
        classifier: &dyn Classifier,
        writer: &dyn RecordWriter,
    ) -> Result<ViewModel, IntakeError> {
        if input.is_empty() {
            return Err(IntakeError::EmptyInput);
        }
        let kind = match self.state.current() {
            Some(question) => question.kind,
            None => return Err(IntakeError::SessionComplete),
        };

        let accepted = validator::validate(input, kind, classifier, &self.accept_label)
            .await
            .map_err(|e| {
                tracing::error!(kind = %kind, error = %e, "Classifier unavailable");
                IntakeError::Classification(e)
            })?;

        if !accepted {
            tracing::debug!(kind = %kind, "Answer rejected");
            self.state.reject(input);
            return Ok(self.view());
        }

        tracing::debug!(kind = %kind, "Answer accepted");
        self.state.record(kind, input);
        self.state.advance();

        if self.is_complete() {
            writer.persist(self.state.answers())?;
            self.saved = true;
            tracing::info!(
                answers = self.state.answers().len(),
                target = %writer.target(),
                "Interview complete"
            );
        }

        Ok(self.view())
    }

    /// Clear the session and start again from the first question.
    pub fn retake(&mut self) -> ViewModel {
        self.state.reset();
        self.saved = false;
        tracing::info!("Interview restarted");
        self.view()
    }
}

//! Question sequencer: a fixed, ordered question list and a forward-only cursor.

use std::sync::Arc;

use crate::error::IntakeError;
use crate::models::Question;

#[derive(Debug, Clone)]
pub struct QuestionSequencer {
    questions: Arc<[Question]>,
    cursor: usize,
}

impl QuestionSequencer {
    /// Build a sequencer positioned on the first question.
    /// Returns `IntakeError::NoQuestions` for an empty list.
    pub fn new(questions: impl Into<Arc<[Question]>>) -> Result<Self, IntakeError> {
        let questions = questions.into();
        if questions.is_empty() {
            return Err(IntakeError::NoQuestions);
        }
        Ok(Self {
            questions,
            cursor: 0,
        })
    }

    /// Question under the cursor, or `None` once every question is answered.
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    /// Move to the next question. Call only after an accepted answer.
    pub fn advance(&mut self) {
        if self.cursor < self.questions.len() {
            self.cursor += 1;
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

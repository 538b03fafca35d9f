use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IntakeError;

/// Which validation rule and which output column an answer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Name,
    Age,
    Gender,
    College,
    Year,
    Cgpa,
    Experience,
    Skills,
    Reason,
    /// Free-text fallback, judged by the classifier.
    Other,
}

impl FieldKind {
    pub const ALL: [FieldKind; 10] = [
        FieldKind::Name,
        FieldKind::Age,
        FieldKind::Gender,
        FieldKind::College,
        FieldKind::Year,
        FieldKind::Cgpa,
        FieldKind::Experience,
        FieldKind::Skills,
        FieldKind::Reason,
        FieldKind::Other,
    ];

    /// Stable label used for column headers and config.
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Age => "age",
            FieldKind::Gender => "gender",
            FieldKind::College => "college",
            FieldKind::Year => "year",
            FieldKind::Cgpa => "cgpa",
            FieldKind::Experience => "experience",
            FieldKind::Skills => "skills",
            FieldKind::Reason => "reason",
            FieldKind::Other => "other",
        }
    }

    /// Label as shown in the summary: first letter upper-cased, underscores as spaces.
    pub fn display_label(self) -> String {
        let label = self.label().replace('_', " ");
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FieldKind {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .iter()
            .copied()
            .find(|k| k.label() == s)
            .ok_or_else(|| IntakeError::UnknownFieldKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub kind: FieldKind,
}

impl Question {
    pub fn new(prompt: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
        }
    }
}

/// The hiring interview asked when no `[[questions]]` are configured.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new("What is your full name?", FieldKind::Name),
        Question::new("How old are you?", FieldKind::Age),
        Question::new("What is your gender? (Male/Female/Other)", FieldKind::Gender),
        Question::new("What is your college name?", FieldKind::College),
        Question::new("What year are you in college? (1-4)", FieldKind::Year),
        Question::new("What is your CGPA?", FieldKind::Cgpa),
        Question::new("Years of work experience?", FieldKind::Experience),
        Question::new("Skills you have (e.g., Python, ML, Java)", FieldKind::Skills),
        Question::new("Why are you applying for this job?", FieldKind::Reason),
    ]
}

pub mod question;
pub mod transcript;

pub use question::{default_questions, FieldKind, Question};
pub use transcript::{TranscriptEntry, ACCEPTED_MESSAGE, REJECTED_MESSAGE};

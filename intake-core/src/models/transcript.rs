use serde::{Deserialize, Serialize};

pub const ACCEPTED_MESSAGE: &str = "✅ Noted! Let's move on.";
pub const REJECTED_MESSAGE: &str = "❌ Invalid response. Please try again.";

/// One exchange: what the user typed and what the bot answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub user: String,
    pub bot: String,
}

impl TranscriptEntry {
    pub fn accepted(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: ACCEPTED_MESSAGE.to_string(),
        }
    }

    pub fn rejected(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: REJECTED_MESSAGE.to_string(),
        }
    }
}

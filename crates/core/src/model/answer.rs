use serde::{Deserialize, Serialize};

/// The answer recorded in one question slot.
///
/// An empty `answer` means the slot is unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub answer: String,
    pub time_spent_seconds: u32,
}

impl UserAnswer {
    #[must_use]
    pub fn new(answer: impl Into<String>, time_spent_seconds: u32) -> Self {
        Self {
            answer: answer.into(),
            time_spent_seconds,
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }
}

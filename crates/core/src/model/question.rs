use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least 2 options, got {0}")]
    TooFewOptions(usize),

    #[error("correct option is not one of the listed options")]
    AnswerNotInOptions,
}

/// A multiple-choice question as produced by the question generator.
///
/// Serialized with the generator's field names: `question`, `options`, `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    prompt: String,
    options: Vec<String>,
    #[serde(rename = "answer")]
    correct_option: String,
}

impl Question {
    /// Builds a question without checking its shape.
    ///
    /// Call [`Question::validate`] on anything that crossed a process boundary.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            correct_option: correct_option.into(),
        }
    }

    /// Checks the prompt is present, there are at least two options, and the
    /// correct option is one of them.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions(self.options.len()));
        }
        if !self.options.contains(&self.correct_option) {
            return Err(QuestionError::AnswerNotInOptions);
        }
        Ok(())
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_option == answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn well_formed_question_validates() {
        let q = Question::new("2 + 2?", opts(&["3", "4"]), "4");
        assert!(q.validate().is_ok());
        assert!(q.is_correct("4"));
        assert!(!q.is_correct("3"));
    }

    #[test]
    fn malformed_questions_are_rejected() {
        let q = Question::new(" ", opts(&["a", "b"]), "a");
        assert_eq!(q.validate(), Err(QuestionError::EmptyPrompt));

        let q = Question::new("Q", opts(&["a"]), "a");
        assert_eq!(q.validate(), Err(QuestionError::TooFewOptions(1)));

        let q = Question::new("Q", opts(&["a", "b"]), "c");
        assert_eq!(q.validate(), Err(QuestionError::AnswerNotInOptions));
    }

    #[test]
    fn deserializes_generator_field_names() {
        let json = r#"{"question":"Q","options":["x","y"],"answer":"y"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.prompt(), "Q");
        assert_eq!(q.correct_option(), "y");
    }
}

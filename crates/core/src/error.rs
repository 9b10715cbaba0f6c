use thiserror::Error;

use crate::model::{QuestionError, QuizConfigError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] QuizConfigError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}

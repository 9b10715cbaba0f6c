mod answer;
mod config;
mod question;

pub use answer::UserAnswer;
pub use config::{Level, QUANTITY_RANGE, QuizConfig, QuizConfigError, TIMER_MINUTES_RANGE};
pub use question::{Question, QuestionError};

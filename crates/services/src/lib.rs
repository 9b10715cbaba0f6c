#![forbid(unsafe_code)]

pub mod error;
pub mod flow;
pub mod generator;
pub mod results;
pub mod ticker;

pub use quiz_core::Clock;

pub use error::{FlowError, GeneratorError};
pub use flow::{QuizFlow, QuizOutcome};
pub use generator::{
    GeneratorConfig, LlmQuestionGenerator, QuestionGenerator, ScriptedGenerator,
};
pub use results::{Feedback, QuizReport, ResultsView, ReviewItem};
pub use ticker::{Tick, Ticker, TickerHandle};

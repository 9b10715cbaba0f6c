#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod time;
pub mod timer;
pub mod view;

pub use error::Error;
pub use session::{QuizAction, QuizState, apply};
pub use time::Clock;
pub use timer::CountdownTimer;
pub use view::{AnswersView, NavigationView, Progress, Score, StatsView};

use crate::model::{Question, QuizConfig, UserAnswer};

//
// ─── ACTIONS ───────────────────────────────────────────────────────────────────
//

/// Named transitions over [`QuizState`].
///
/// Every action is total: out-of-range indices are clamped or ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizAction {
    SetConfig(QuizConfig),
    SetQuestions(Vec<Question>),
    NextQuestion,
    PreviousQuestion,
    GoToQuestion(usize),
    SetAnswer {
        index: usize,
        answer: String,
        time_spent_seconds: u32,
    },
    CompleteQuiz,
    ResetQuiz,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Authoritative progress of one quiz.
///
/// Once questions are set, `answers` is index-aligned with `questions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    config: QuizConfig,
    questions: Vec<Question>,
    answers: Vec<UserAnswer>,
    cursor: usize,
    completed: bool,
}

impl QuizState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `action` in place.
    pub fn dispatch(&mut self, action: QuizAction) {
        let previous = std::mem::take(self);
        *self = apply(previous, action);
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[UserAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&UserAnswer> {
        self.answers.get(index)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }
}

fn empty_slots(len: usize) -> Vec<UserAnswer> {
    vec![UserAnswer::default(); len]
}

/// Computes the state that follows `state` under `action`.
#[must_use]
pub fn apply(state: QuizState, action: QuizAction) -> QuizState {
    match action {
        QuizAction::SetConfig(config) => {
            let slots = usize::try_from(config.quantity_questions()).unwrap_or(0);
            QuizState {
                config,
                answers: empty_slots(slots),
                ..state
            }
        }
        QuizAction::SetQuestions(questions) => QuizState {
            answers: empty_slots(questions.len()),
            questions,
            ..state
        },
        QuizAction::NextQuestion => {
            let cursor = (state.cursor + 1).min(state.last_index());
            QuizState { cursor, ..state }
        }
        QuizAction::PreviousQuestion => {
            let cursor = state.cursor.saturating_sub(1);
            QuizState { cursor, ..state }
        }
        QuizAction::GoToQuestion(index) => {
            let cursor = index.min(state.last_index());
            QuizState { cursor, ..state }
        }
        QuizAction::SetAnswer {
            index,
            answer,
            time_spent_seconds,
        } => {
            let mut state = state;
            if let Some(slot) = state.answers.get_mut(index) {
                *slot = UserAnswer::new(answer, time_spent_seconds);
            }
            state
        }
        QuizAction::CompleteQuiz => QuizState {
            completed: true,
            ..state
        },
        QuizAction::ResetQuiz => QuizState::default(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

//! Read-only projections of [`QuizState`], recomputed on every call.

use crate::model::{Question, QuizConfig, UserAnswer};
use crate::session::QuizState;

/// Rounds `100 * part / whole` half-up; 0 when `whole` is 0.
#[must_use]
pub fn round_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

fn answered_count(answers: &[UserAnswer]) -> usize {
    answers.iter().filter(|a| a.is_answered()).count()
}

//
// ─── NAVIGATION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationView {
    pub cursor: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub is_first: bool,
    pub is_last: bool,
    pub progress: Progress,
}

impl NavigationView {
    #[must_use]
    pub fn of(state: &QuizState) -> Self {
        let cursor = state.cursor();
        let total = state.questions().len();
        let current = cursor + 1;
        Self {
            cursor,
            can_go_next: state.answer(cursor).is_some_and(UserAnswer::is_answered),
            can_go_previous: cursor > 0,
            is_first: cursor == 0,
            is_last: total > 0 && cursor == total - 1,
            progress: Progress {
                current,
                total,
                percentage: round_percentage(current, total),
            },
        }
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswersView<'a> {
    pub current_question: Option<&'a Question>,
    pub current_answer: &'a str,
    pub has_answered_current: bool,
    pub answered_count: usize,
    pub total_questions: usize,
}

impl<'a> AnswersView<'a> {
    #[must_use]
    pub fn of(state: &'a QuizState) -> Self {
        let current_answer = state
            .answer(state.cursor())
            .map_or("", |slot| slot.answer.as_str());
        Self {
            current_question: state.questions().get(state.cursor()),
            current_answer,
            has_answered_current: !current_answer.is_empty(),
            answered_count: answered_count(state.answers()),
            total_questions: state.questions().len(),
        }
    }

    #[must_use]
    pub fn is_answer_selected(&self, option: &str) -> bool {
        self.has_answered_current && self.current_answer == option
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Correct-answer tally. Only final once the quiz is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Score {
    #[must_use]
    pub fn of(state: &QuizState) -> Self {
        let correct = state
            .questions()
            .iter()
            .zip(state.answers())
            .filter(|(question, slot)| question.is_correct(&slot.answer))
            .count();
        let total = state.questions().len();
        Self {
            correct,
            total,
            percentage: round_percentage(correct, total),
        }
    }
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView<'a> {
    pub config: &'a QuizConfig,
    pub progress: Progress,
    pub score: Score,
    pub completion_percentage: u32,
    pub is_ready: bool,
    pub is_complete: bool,
    pub total_time_spent: u32,
    pub average_time_per_question: u32,
    pub questions_answered: usize,
    pub total_questions: usize,
}

impl<'a> StatsView<'a> {
    #[must_use]
    pub fn of(state: &'a QuizState) -> Self {
        let total_questions = state.questions().len();
        let questions_answered = answered_count(state.answers());
        let total_time_spent = state
            .answers()
            .iter()
            .map(|slot| slot.time_spent_seconds)
            .fold(0_u32, u32::saturating_add);
        let average_time_per_question = match u32::try_from(questions_answered) {
            Ok(0) | Err(_) => 0,
            Ok(n) => (2 * total_time_spent + n) / (2 * n),
        };

        Self {
            config: state.config(),
            progress: NavigationView::of(state).progress,
            score: Score::of(state),
            completion_percentage: round_percentage(questions_answered, total_questions),
            is_ready: total_questions > 0,
            is_complete: state.is_completed(),
            total_time_spent,
            average_time_per_question,
            questions_answered,
            total_questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuizAction;

    fn loaded(n: usize) -> QuizState {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    format!("Q{i}"),
                    vec!["A".to_string(), "B".to_string()],
                    "A",
                )
            })
            .collect();
        let mut state = QuizState::new();
        state.dispatch(QuizAction::SetQuestions(questions));
        state
    }

    fn answer(state: &mut QuizState, index: usize, answer: &str, time: u32) {
        state.dispatch(QuizAction::SetAnswer {
            index,
            answer: answer.to_string(),
            time_spent_seconds: time,
        });
    }

    #[test]
    fn percentages_round_half_up() {
        assert_eq!(round_percentage(1, 3), 33);
        assert_eq!(round_percentage(2, 3), 67);
        assert_eq!(round_percentage(1, 8), 13);
        assert_eq!(round_percentage(0, 0), 0);
    }

    #[test]
    fn navigation_on_empty_state() {
        let nav = NavigationView::of(&QuizState::new());
        assert!(!nav.can_go_next);
        assert!(!nav.can_go_previous);
        assert!(nav.is_first);
        assert!(!nav.is_last);
        assert_eq!(nav.progress, Progress { current: 1, total: 0, percentage: 0 });
    }

    #[test]
    fn navigation_tracks_cursor_and_answers() {
        let mut state = loaded(3);
        assert!(!NavigationView::of(&state).can_go_next);

        answer(&mut state, 0, "B", 4);
        let nav = NavigationView::of(&state);
        assert!(nav.can_go_next);
        assert!(nav.is_first);
        assert_eq!(nav.progress.percentage, 33);

        state.dispatch(QuizAction::GoToQuestion(2));
        let nav = NavigationView::of(&state);
        assert!(nav.is_last);
        assert!(nav.can_go_previous);
        assert!(!nav.can_go_next);
        assert_eq!(nav.progress, Progress { current: 3, total: 3, percentage: 100 });
    }

    #[test]
    fn answers_view_reports_current_selection() {
        let mut state = loaded(3);
        answer(&mut state, 0, "B", 4);
        answer(&mut state, 2, "A", 4);

        let view = AnswersView::of(&state);
        assert_eq!(view.current_question.map(Question::prompt), Some("Q0"));
        assert!(view.has_answered_current);
        assert!(view.is_answer_selected("B"));
        assert!(!view.is_answer_selected("A"));
        assert_eq!(view.answered_count, 2);
        assert_eq!(view.total_questions, 3);
    }

    #[test]
    fn answers_view_without_questions() {
        let state = QuizState::new();
        let view = AnswersView::of(&state);
        assert!(view.current_question.is_none());
        assert!(!view.is_answer_selected(""));
    }

    #[test]
    fn score_counts_matching_slots() {
        let mut state = loaded(3);
        answer(&mut state, 0, "A", 5);
        answer(&mut state, 2, "B", 5);
        assert_eq!(Score::of(&state), Score { correct: 1, total: 3, percentage: 33 });
        assert_eq!(Score::of(&QuizState::new()).percentage, 0);
    }

    #[test]
    fn stats_aggregate_time_and_completion() {
        let mut state = loaded(4);
        answer(&mut state, 0, "A", 10);
        answer(&mut state, 1, "", 60);
        answer(&mut state, 2, "B", 15);

        let stats = StatsView::of(&state);
        assert!(stats.is_ready);
        assert!(!stats.is_complete);
        assert_eq!(stats.questions_answered, 2);
        assert_eq!(stats.completion_percentage, 50);
        assert_eq!(stats.total_time_spent, 85);
        assert_eq!(stats.average_time_per_question, 43);
    }
}

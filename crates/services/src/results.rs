use chrono::{DateTime, Utc};

use quiz_core::{QuizState, Score, StatsView};

/// Encouragement tier shown with the final score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Excellent,
    Good,
    KeepPracticing,
}

impl Feedback {
    #[must_use]
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            _ => Self::KeepPracticing,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Feedback::Excellent => "Excellent! You have a solid grasp of these concepts.",
            Feedback::Good => "Good work! Keep practicing.",
            Feedback::KeepPracticing => "Keep studying, you will get there!",
        }
    }
}

/// One row of the answer review.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItem {
    pub index: usize,
    pub prompt: String,
    pub user_answer: Option<String>,
    pub correct_option: String,
    pub is_correct: bool,
    pub time_spent_seconds: u32,
}

/// Everything the results screen shows for a completed quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizReport {
    pub score: Score,
    pub feedback: Feedback,
    pub items: Vec<ReviewItem>,
    pub total_time_spent: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The results screen: a report, or a placeholder pointing back to configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultsView {
    NotReady,
    Ready(QuizReport),
}

impl ResultsView {
    #[must_use]
    pub fn of(
        state: &QuizState,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        if state.questions().is_empty() || !state.is_completed() {
            return Self::NotReady;
        }

        let items = state
            .questions()
            .iter()
            .zip(state.answers())
            .enumerate()
            .map(|(index, (question, slot))| ReviewItem {
                index,
                prompt: question.prompt().to_string(),
                user_answer: slot.is_answered().then(|| slot.answer.clone()),
                correct_option: question.correct_option().to_string(),
                is_correct: question.is_correct(&slot.answer),
                time_spent_seconds: slot.time_spent_seconds,
            })
            .collect();

        let score = Score::of(state);
        Self::Ready(QuizReport {
            score,
            feedback: Feedback::for_percentage(score.percentage),
            items,
            total_time_spent: StatsView::of(state).total_time_spent,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn report(&self) -> Option<&QuizReport> {
        match self {
            ResultsView::Ready(report) => Some(report),
            ResultsView::NotReady => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::QuizAction;
    use quiz_core::model::Question;

    fn completed_state(answers: &[&str]) -> QuizState {
        let questions = answers
            .iter()
            .enumerate()
            .map(|(i, _)| {
                Question::new(format!("Q{i}"), vec!["a".into(), "b".into()], "a")
            })
            .collect();
        let mut state = QuizState::new();
        state.dispatch(QuizAction::SetQuestions(questions));
        for (index, answer) in answers.iter().enumerate() {
            state.dispatch(QuizAction::SetAnswer {
                index,
                answer: (*answer).to_string(),
                time_spent_seconds: 10,
            });
        }
        state.dispatch(QuizAction::CompleteQuiz);
        state
    }

    #[test]
    fn feedback_tiers() {
        assert_eq!(Feedback::for_percentage(100), Feedback::Excellent);
        assert_eq!(Feedback::for_percentage(80), Feedback::Excellent);
        assert_eq!(Feedback::for_percentage(67), Feedback::Good);
        assert_eq!(Feedback::for_percentage(33), Feedback::KeepPracticing);
    }

    #[test]
    fn results_are_not_ready_before_completion() {
        assert_eq!(ResultsView::of(&QuizState::new(), None, None), ResultsView::NotReady);

        let mut state = completed_state(&["a"]);
        state.dispatch(QuizAction::ResetQuiz);
        assert!(ResultsView::of(&state, None, None).report().is_none());
    }

    #[test]
    fn report_lists_each_question() {
        let view = ResultsView::of(&completed_state(&["a", "", "b"]), None, None);
        let report = view.report().unwrap();
        assert_eq!(report.score.correct, 1);
        assert_eq!(report.feedback, Feedback::KeepPracticing);
        assert_eq!(report.total_time_spent, 30);
        assert_eq!(report.items[0].user_answer.as_deref(), Some("a"));
        assert!(report.items[0].is_correct);
        assert_eq!(report.items[1].user_answer, None);
        assert!(!report.items[1].is_correct);
        assert_eq!(report.items[2].correct_option, "a");
    }
}

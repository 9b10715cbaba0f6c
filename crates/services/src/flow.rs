use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use quiz_core::model::QuizConfig;
use quiz_core::{
    AnswersView, Clock, CountdownTimer, NavigationView, QuizAction, QuizState, Score, StatsView,
};

use crate::error::FlowError;
use crate::generator::QuestionGenerator;
use crate::results::ResultsView;
use crate::ticker::{Tick, Ticker, TickerHandle};

/// What the caller should show after a flow event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizOutcome {
    Continue,
    Completed,
}

/// Drives one quiz: owns the session state and the countdown for the current question.
///
/// Every change of the current question replaces the countdown with a fresh one
/// and, when a [`Ticker`] is attached, cancels the previous tick task.
pub struct QuizFlow {
    clock: Clock,
    state: QuizState,
    timer: CountdownTimer,
    generation: u64,
    ticker: Option<Ticker>,
    active_ticks: Option<TickerHandle>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizFlow {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        let state = QuizState::new();
        let timer = CountdownTimer::new(state.config().timer_minutes());
        Self {
            clock,
            state,
            timer,
            generation: 0,
            ticker: None,
            active_ticks: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Attach a ticker so countdowns advance in real time.
    #[must_use]
    pub fn with_ticker(mut self, ticker: Ticker) -> Self {
        self.ticker = Some(ticker);
        self
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    /// Identifies the current countdown; ticks for other generations are ignored.
    #[must_use]
    pub fn timer_generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn navigation(&self) -> NavigationView {
        NavigationView::of(&self.state)
    }

    #[must_use]
    pub fn answers(&self) -> AnswersView<'_> {
        AnswersView::of(&self.state)
    }

    #[must_use]
    pub fn stats(&self) -> StatsView<'_> {
        StatsView::of(&self.state)
    }

    #[must_use]
    pub fn score(&self) -> Score {
        Score::of(&self.state)
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Results screen model; not ready until the quiz is completed.
    #[must_use]
    pub fn results(&self) -> ResultsView {
        ResultsView::of(&self.state, self.started_at, self.completed_at)
    }

    /// Start over with `config`, discarding any previous quiz.
    pub fn configure(&mut self, config: QuizConfig) {
        self.teardown();
        self.dispatch(QuizAction::ResetQuiz);
        self.timer = CountdownTimer::new(config.timer_minutes());
        self.dispatch(QuizAction::SetConfig(config));
        self.started_at = None;
        self.completed_at = None;
    }

    /// Fetch questions for the configured quiz and begin the first countdown.
    ///
    /// On failure the state is left as it was, so the call can be retried.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Generation` when the generator fails.
    pub async fn load_questions(
        &mut self,
        generator: &dyn QuestionGenerator,
    ) -> Result<(), FlowError> {
        let questions = match generator.generate(self.state.config()).await {
            Ok(questions) => questions,
            Err(err) => {
                warn!(%err, "question generation failed");
                return Err(err.into());
            }
        };

        info!(count = questions.len(), "questions loaded");
        self.dispatch(QuizAction::SetQuestions(questions));
        self.dispatch(QuizAction::GoToQuestion(0));
        self.started_at = Some(self.clock.now());
        self.completed_at = None;
        self.restart_timer();
        Ok(())
    }

    /// Configure and load in one step.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Generation` when the generator fails.
    pub async fn start(
        &mut self,
        config: QuizConfig,
        generator: &dyn QuestionGenerator,
    ) -> Result<(), FlowError> {
        self.configure(config);
        self.load_questions(generator).await
    }

    /// Record `option` for the current question with the time spent so far.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotReady` before questions are loaded and
    /// `FlowError::Completed` once the quiz is finished.
    pub fn select_answer(&mut self, option: &str) -> Result<(), FlowError> {
        self.ensure_active()?;
        self.record_current(option.to_string());
        Ok(())
    }

    /// Move to the next question, or finish the quiz from the last one.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotReady` or `FlowError::Completed` as for `select_answer`.
    pub fn advance(&mut self) -> Result<QuizOutcome, FlowError> {
        self.ensure_active()?;
        self.persist_pending();
        Ok(self.advance_or_complete())
    }

    /// Move back one question. Never completes the quiz.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotReady` or `FlowError::Completed` as for `select_answer`.
    pub fn previous(&mut self) -> Result<(), FlowError> {
        self.ensure_active()?;
        self.persist_pending();
        self.navigate(QuizAction::PreviousQuestion);
        Ok(())
    }

    /// Jump to question `index`, clamped to the loaded range.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotReady` or `FlowError::Completed` as for `select_answer`.
    pub fn go_to(&mut self, index: usize) -> Result<(), FlowError> {
        self.ensure_active()?;
        self.persist_pending();
        self.navigate(QuizAction::GoToQuestion(index));
        Ok(())
    }

    /// Handle a tick from the attached ticker.
    ///
    /// Returns `Some` when the tick expired the countdown and the flow moved on.
    pub fn on_tick(&mut self, tick: Tick) -> Option<QuizOutcome> {
        if tick.generation != self.generation {
            debug!(
                stale = tick.generation,
                current = self.generation,
                "ignoring stale tick"
            );
            return None;
        }
        self.tick_second()
    }

    /// Advance the current countdown by one second.
    pub fn tick_second(&mut self) -> Option<QuizOutcome> {
        if self.state.is_completed() || self.state.questions().is_empty() {
            return None;
        }
        self.timer.tick();
        if self.timer.take_expiry() {
            return Some(self.expire());
        }
        None
    }

    /// Clear the quiz entirely, e.g. to configure a new one from the results screen.
    pub fn restart(&mut self) {
        self.teardown();
        self.dispatch(QuizAction::ResetQuiz);
        self.timer = CountdownTimer::new(self.state.config().timer_minutes());
        self.started_at = None;
        self.completed_at = None;
    }

    /// Stop the running countdown and its tick task.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.active_ticks.take() {
            handle.cancel();
        }
        self.timer.stop();
        self.generation += 1;
    }

    fn expire(&mut self) -> QuizOutcome {
        let selected = self.answers().current_answer.to_string();
        debug!(
            index = self.state.cursor(),
            answered = !selected.is_empty(),
            "countdown expired"
        );
        self.record_current(selected);
        self.advance_or_complete()
    }

    fn advance_or_complete(&mut self) -> QuizOutcome {
        if self.navigation().is_last {
            self.teardown();
            self.dispatch(QuizAction::CompleteQuiz);
            self.completed_at = Some(self.clock.now());
            info!(score = ?self.score(), "quiz completed");
            QuizOutcome::Completed
        } else {
            self.navigate(QuizAction::NextQuestion);
            QuizOutcome::Continue
        }
    }

    fn navigate(&mut self, action: QuizAction) {
        let before = self.state.cursor();
        self.dispatch(action);
        if self.state.cursor() != before {
            self.restart_timer();
        }
    }

    fn persist_pending(&mut self) {
        let pending = self.answers().current_answer.to_string();
        if !pending.is_empty() {
            self.record_current(pending);
        }
    }

    fn record_current(&mut self, answer: String) {
        self.dispatch(QuizAction::SetAnswer {
            index: self.state.cursor(),
            answer,
            time_spent_seconds: self.timer.time_spent(),
        });
    }

    fn restart_timer(&mut self) {
        self.teardown();
        self.timer = CountdownTimer::new(self.state.config().timer_minutes());
        self.timer.start();
        if let Some(ticker) = &self.ticker {
            self.active_ticks = Some(ticker.spawn(self.generation));
        }
    }

    fn ensure_active(&self) -> Result<(), FlowError> {
        if self.state.is_completed() {
            return Err(FlowError::Completed);
        }
        if self.state.questions().is_empty() {
            return Err(FlowError::NotReady);
        }
        Ok(())
    }

    fn dispatch(&mut self, action: QuizAction) {
        debug!(?action, "quiz transition");
        self.state.dispatch(action);
    }
}

impl fmt::Debug for QuizFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizFlow")
            .field("cursor", &self.state.cursor())
            .field("questions_len", &self.state.questions().len())
            .field("completed", &self.state.is_completed())
            .field("generation", &self.generation)
            .field("remaining_seconds", &self.timer.remaining_seconds())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

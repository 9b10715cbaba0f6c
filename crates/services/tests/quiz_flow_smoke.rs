use quiz_core::model::{Level, Question, QuizConfig};
use quiz_core::time::fixed_now;
use services::{Clock, Feedback, FlowError, QuizFlow, QuizOutcome, ScriptedGenerator, Ticker};

fn question(prompt: &str, correct: &str) -> Question {
    Question::new(
        prompt,
        vec!["10".to_string(), "20".to_string(), "30".to_string()],
        correct,
    )
}

fn three_questions() -> Vec<Question> {
    vec![
        question("Sinks sold on Monday?", "10"),
        question("Tanks in stock?", "20"),
        question("Cabinets per crate?", "30"),
    ]
}

#[tokio::test]
async fn scored_scenario_with_an_expired_question() {
    let generator = ScriptedGenerator::new().with_questions(three_questions());
    let config = QuizConfig::new(Level::Easy, ["A"], 3, 1).unwrap();
    let mut flow = QuizFlow::new(Clock::fixed(fixed_now()));
    flow.start(config, &generator).await.unwrap();

    flow.select_answer("10").unwrap();
    assert_eq!(flow.advance().unwrap(), QuizOutcome::Continue);

    let mut outcome = None;
    while outcome.is_none() {
        outcome = flow.tick_second();
    }
    assert_eq!(outcome, Some(QuizOutcome::Continue));
    assert_eq!(flow.state().cursor(), 2);

    flow.select_answer("10").unwrap();
    assert_eq!(flow.advance().unwrap(), QuizOutcome::Completed);

    let score = flow.score();
    assert_eq!((score.correct, score.total, score.percentage), (1, 3, 33));

    let results = flow.results();
    let report = results.report().expect("completed quiz has a report");
    assert_eq!(report.feedback, Feedback::KeepPracticing);
    assert_eq!(report.items[1].user_answer, None);
    assert_eq!(report.items[1].time_spent_seconds, 60);
    assert_eq!(report.completed_at, Some(fixed_now()));
}

#[tokio::test]
async fn generation_can_be_retried_after_failure() {
    let generator = ScriptedGenerator::new()
        .with_failure("```json\nnot an array\n```")
        .with_questions(three_questions());
    let config = QuizConfig::new(Level::Medium, ["Percentages"], 3, 2).unwrap();
    let mut flow = QuizFlow::new(Clock::fixed(fixed_now()));

    let err = flow.start(config, &generator).await.unwrap_err();
    assert!(matches!(err, FlowError::Generation(_)));
    assert!(flow.state().questions().is_empty());
    assert_eq!(flow.state().answers().len(), 3);

    flow.load_questions(&generator).await.unwrap();
    assert_eq!(flow.state().questions().len(), 3);
    assert_eq!(flow.timer().total_seconds(), 120);
    assert!(flow.timer().is_running());
}

#[tokio::test]
async fn answer_slots_follow_the_generated_question_count() {
    let generator = ScriptedGenerator::new().with_questions(three_questions());
    let config = QuizConfig::new(Level::Hard, ["A"], 5, 1).unwrap();
    let mut flow = QuizFlow::new(Clock::default());
    flow.start(config, &generator).await.unwrap();
    assert_eq!(flow.state().answers().len(), 3);
    assert!(flow.navigation().is_first);
}

#[tokio::test(start_paused = true)]
async fn real_time_ticks_expire_each_question() {
    let (ticker, mut ticks) = Ticker::channel();
    let generator = ScriptedGenerator::new().with_questions(three_questions());
    let config = QuizConfig::new(Level::Easy, ["A"], 3, 1).unwrap();
    let mut flow = QuizFlow::new(Clock::fixed(fixed_now())).with_ticker(ticker);
    flow.start(config, &generator).await.unwrap();

    let mut expiries = 0;
    while let Some(tick) = ticks.recv().await {
        match flow.on_tick(tick) {
            Some(QuizOutcome::Continue) => expiries += 1,
            Some(QuizOutcome::Completed) => break,
            None => {}
        }
    }

    assert_eq!(expiries, 2);
    assert!(flow.state().is_completed());
    assert!(
        flow.state()
            .answers()
            .iter()
            .all(|slot| slot.answer.is_empty() && slot.time_spent_seconds == 60)
    );
}

use std::fmt;

use quiz_core::model::{Level, Question, QuizConfig, QuizConfigError};
use quiz_core::time::{format_clock, format_duration};
use services::{
    Clock, LlmQuestionGenerator, QuestionGenerator, QuizFlow, QuizOutcome, ResultsView,
    ScriptedGenerator, Tick, Ticker,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    Config(quiz_core::Error),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::Config(err) => write!(f, "invalid quiz settings: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<QuizConfigError> for ArgsError {
    fn from(err: QuizConfigError) -> Self {
        ArgsError::Config(err.into())
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number(raw: String, flag: &'static str) -> Result<u32, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play [--level <easy|medium|hard>] [--theme <name>]... [--questions <3-5>] [--minutes <1-5>]");
    eprintln!("  cargo run -p app -- demo [same flags]   # offline, built-in questions");
    eprintln!();
    eprintln!("Controls: A-Z select an option, n next, p previous, q quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL");
    eprintln!("  QUIZ_LEVEL, QUIZ_THEMES (comma separated), QUIZ_QUESTIONS, QUIZ_MINUTES");
    eprintln!("  RUST_LOG (default: warn)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Demo,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

/// Quiz settings taken from the environment, used when no flag overrides them.
#[derive(Debug, Default, Clone)]
struct EnvDefaults {
    level: Option<String>,
    themes: Option<String>,
    questions: Option<String>,
    minutes: Option<String>,
}

impl EnvDefaults {
    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            level: var("QUIZ_LEVEL"),
            themes: var("QUIZ_THEMES"),
            questions: var("QUIZ_QUESTIONS"),
            minutes: var("QUIZ_MINUTES"),
        }
    }
}

#[derive(Debug)]
enum ParsedArgs {
    Help,
    Run(QuizConfig),
}

fn parse_config(
    args: &mut impl Iterator<Item = String>,
    defaults: &EnvDefaults,
) -> Result<ParsedArgs, ArgsError> {
    let mut level = match &defaults.level {
        Some(raw) => raw.parse::<Level>()?,
        None => Level::default(),
    };
    let mut themes: Vec<String> = defaults
        .themes
        .as_deref()
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let mut questions = match &defaults.questions {
        Some(raw) => parse_number(raw.clone(), "QUIZ_QUESTIONS")?,
        None => 3,
    };
    let mut minutes = match &defaults.minutes {
        Some(raw) => parse_number(raw.clone(), "QUIZ_MINUTES")?,
        None => 1,
    };

    let mut cli_themes = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--level" => level = require_value(args, "--level")?.parse()?,
            "--theme" => cli_themes.push(require_value(args, "--theme")?),
            "--questions" => {
                questions = parse_number(require_value(args, "--questions")?, "--questions")?;
            }
            "--minutes" => {
                minutes = parse_number(require_value(args, "--minutes")?, "--minutes")?;
            }
            "--help" | "-h" => return Ok(ParsedArgs::Help),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    if !cli_themes.is_empty() {
        themes = cli_themes;
    }

    Ok(ParsedArgs::Run(QuizConfig::new(level, themes, questions, minutes)?))
}

fn demo_questions(count: u32) -> Vec<Question> {
    let bank = [
        (
            "A stainless steel sink costs 450. With a 10% discount, what is the final price?",
            ["405", "400", "440", "395"],
            "405",
        ),
        (
            "A kitchen cabinet costs 1200 paid in 4 equal installments. How much is each installment?",
            ["250", "300", "350", "400"],
            "300",
        ),
        (
            "The plant builds 36 laundry tanks per day. How many does it build in 5 days?",
            ["150", "170", "180", "190"],
            "180",
        ),
        (
            "Producing a sink costs 120 and it sells for 180. What is the profit per sink?",
            ["40", "50", "60", "70"],
            "60",
        ),
        (
            "3 of every 12 bathroom cabinets are white. What fraction is white?",
            ["1/3", "1/4", "1/6", "1/12"],
            "1/4",
        ),
    ];
    bank.iter()
        .take(usize::try_from(count).unwrap_or(bank.len()))
        .map(|(prompt, options, answer)| {
            Question::new(*prompt, options.iter().map(|o| (*o).to_string()).collect(), *answer)
        })
        .collect()
}

fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map_or('?', char::from)
}

fn render_question(flow: &QuizFlow) {
    let nav = flow.navigation();
    let answers = flow.answers();
    let Some(question) = answers.current_question else {
        return;
    };
    println!();
    println!(
        "Question {} of {} ({}%)  [{} left]",
        nav.progress.current,
        nav.progress.total,
        nav.progress.percentage,
        flow.timer().remaining_formatted()
    );
    println!("{}", question.prompt());
    for (index, option) in question.options().iter().enumerate() {
        let marker = if answers.is_answer_selected(option) { '*' } else { ' ' };
        println!(" {marker} {}. {option}", option_letter(index));
    }
    let next = if nav.is_last { "finish" } else { "next" };
    println!("> letter to answer, n {next}, p previous, q quit");
}

fn render_results(view: &ResultsView) {
    let Some(report) = view.report() else {
        println!("No completed quiz to show. Configure a new one to start.");
        return;
    };
    println!();
    println!(
        "Quiz finished: {}/{} correct ({}%)",
        report.score.correct, report.score.total, report.score.percentage
    );
    println!("{}", report.feedback.message());
    println!("Total time: {}", format_duration(report.total_time_spent));
    for item in &report.items {
        let mark = if item.is_correct { "ok" } else { "x " };
        println!(
            "[{mark}] {}. {} | yours: {} | correct: {} | {}",
            item.index + 1,
            item.prompt,
            item.user_answer.as_deref().unwrap_or("(no answer)"),
            item.correct_option,
            format_duration(item.time_spent_seconds)
        );
    }
}

enum Input {
    Select(usize),
    Next,
    Previous,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "q" | "quit" => Input::Quit,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c @ 'a'..='z'), None) => Input::Select(c as usize - 'a' as usize),
                _ => Input::Unknown,
            }
        }
    }
}

/// Runs the interactive loop until the quiz completes or the user quits.
///
/// Returns `true` when the quiz was completed.
async fn play(
    flow: &mut QuizFlow,
    ticks: &mut UnboundedReceiver<Tick>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    render_question(flow);

    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => {
                match flow.on_tick(tick) {
                    Some(QuizOutcome::Completed) => {
                        println!("Time is up!");
                        return Ok(true);
                    }
                    Some(QuizOutcome::Continue) => {
                        println!("Time is up!");
                        render_question(flow);
                    }
                    None => {
                        let timer = flow.timer();
                        if timer.is_critical_time() || timer.remaining_seconds() % 15 == 0 {
                            println!("  {} left", format_clock(timer.remaining_seconds()));
                        }
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("input closed; leaving the quiz");
                    flow.teardown();
                    return Ok(false);
                };
                match parse_input(&line) {
                    Input::Select(index) => {
                        let option = flow
                            .answers()
                            .current_question
                            .and_then(|q| q.options().get(index).cloned());
                        match option {
                            Some(option) => {
                                flow.select_answer(&option)?;
                                render_question(flow);
                            }
                            None => println!("No such option."),
                        }
                    }
                    Input::Next => {
                        if !flow.navigation().can_go_next {
                            println!("Select an answer first.");
                            continue;
                        }
                        if flow.advance()? == QuizOutcome::Completed {
                            return Ok(true);
                        }
                        render_question(flow);
                    }
                    Input::Previous => {
                        if flow.navigation().can_go_previous {
                            flow.previous()?;
                        }
                        render_question(flow);
                    }
                    Input::Quit => {
                        info!(index = flow.state().cursor(), "quiz abandoned");
                        flow.teardown();
                        return Ok(false);
                    }
                    Input::Unknown => println!("Use a letter, n, p, or q."),
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = parse_config(&mut argv.into_iter(), &EnvDefaults::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let config = match parsed {
        ParsedArgs::Help => {
            print_usage();
            return Ok(());
        }
        ParsedArgs::Run(config) => config,
    };

    let generator: Box<dyn QuestionGenerator> = match cmd {
        Command::Play => {
            let generator = LlmQuestionGenerator::from_env();
            if !generator.enabled() {
                warn!("question generator disabled: QUIZ_AI_API_KEY is not set");
                eprintln!("QUIZ_AI_API_KEY is not set; try `demo` for offline questions.");
            }
            Box::new(generator)
        }
        Command::Demo => Box::new(
            ScriptedGenerator::new().with_questions(demo_questions(config.quantity_questions())),
        ),
    };

    let (ticker, mut ticks) = Ticker::channel();
    let mut flow = QuizFlow::new(Clock::default()).with_ticker(ticker);

    println!(
        "Generating {} {} questions on {}...",
        config.quantity_questions(),
        config.level(),
        config.themes().join(", ")
    );
    info!(
        ?cmd,
        level = %config.level(),
        count = config.quantity_questions(),
        minutes = config.timer_minutes(),
        "starting quiz"
    );
    if let Err(err) = flow.start(config, generator.as_ref()).await {
        warn!(%err, "could not start the quiz");
        return Err(err.into());
    }

    if play(&mut flow, &mut ticks).await? {
        info!(score = ?flow.score(), "quiz finished");
        render_results(&flow.results());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_questions_are_well_formed() {
        let questions = demo_questions(5);
        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.validate().is_ok()));
        assert_eq!(demo_questions(3).len(), 3);
    }

    #[test]
    fn input_parsing() {
        assert!(matches!(parse_input(" b "), Input::Select(1)));
        assert!(matches!(parse_input("N"), Input::Next));
        assert!(matches!(parse_input("prev"), Input::Previous));
        assert!(matches!(parse_input("q"), Input::Quit));
        assert!(matches!(parse_input("7"), Input::Unknown));
    }

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| (*arg).to_string()).collect::<Vec<_>>().into_iter()
    }

    fn run_config(raw: &[&str], defaults: &EnvDefaults) -> QuizConfig {
        match parse_config(&mut args(raw), defaults).unwrap() {
            ParsedArgs::Run(config) => config,
            ParsedArgs::Help => panic!("expected settings, got help"),
        }
    }

    fn env_defaults() -> EnvDefaults {
        EnvDefaults {
            level: Some("medium".into()),
            themes: Some("Fractions, Percentages".into()),
            questions: Some("5".into()),
            minutes: Some("3".into()),
        }
    }

    #[test]
    fn cli_flags_override_defaults() {
        let config = run_config(
            &["--level", "hard", "--theme", "Ratios", "--questions", "4", "--minutes", "2"],
            &env_defaults(),
        );
        assert_eq!(config.level(), Level::Hard);
        assert_eq!(config.themes(), ["Ratios"]);
        assert_eq!(config.quantity_questions(), 4);
        assert_eq!(config.timer_minutes(), 2);
    }

    #[test]
    fn environment_fills_in_missing_flags() {
        let config = run_config(&[], &env_defaults());
        assert_eq!(config.level(), Level::Medium);
        assert_eq!(config.themes(), ["Fractions", "Percentages"]);
        assert_eq!(config.quantity_questions(), 5);
        assert_eq!(config.timer_minutes(), 3);
    }

    #[test]
    fn builtin_defaults_need_a_theme() {
        let config = run_config(&["--theme", "Ratios"], &EnvDefaults::default());
        assert_eq!(config.level(), Level::default());
        assert_eq!(config.quantity_questions(), 3);
        assert_eq!(config.timer_minutes(), 1);

        let err = parse_config(&mut args(&[]), &EnvDefaults::default()).unwrap_err();
        assert!(matches!(err, ArgsError::Config(_)));
    }

    #[test]
    fn bad_environment_values_are_reported() {
        let defaults = EnvDefaults {
            questions: Some("many".into()),
            ..env_defaults()
        };
        let err = parse_config(&mut args(&[]), &defaults).unwrap_err();
        assert!(matches!(
            err,
            ArgsError::InvalidNumber { flag: "QUIZ_QUESTIONS", .. }
        ));
    }

    #[test]
    fn help_is_returned_not_exited() {
        let parsed = parse_config(&mut args(&["--theme", "A", "--help"]), &EnvDefaults::default());
        assert!(matches!(parsed, Ok(ParsedArgs::Help)));
        assert!(matches!(
            parse_config(&mut args(&["-h"]), &EnvDefaults::default()),
            Ok(ParsedArgs::Help)
        ));
    }

    #[test]
    fn unknown_flags_and_missing_values_fail() {
        let defaults = env_defaults();
        assert!(matches!(
            parse_config(&mut args(&["--bogus"]), &defaults),
            Err(ArgsError::UnknownArg(arg)) if arg == "--bogus"
        ));
        assert!(matches!(
            parse_config(&mut args(&["--minutes"]), &defaults),
            Err(ArgsError::MissingValue { flag: "--minutes" })
        ));
    }

    #[test]
    fn option_letters() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
    }
}

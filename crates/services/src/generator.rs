use std::collections::VecDeque;
use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use quiz_core::model::{Question, QuizConfig};

use crate::error::GeneratorError;

/// Source of multiple-choice questions for a quiz.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Produce a validated question list for `config`.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` on transport, parse, or validation failure.
    async fn generate(&self, config: &QuizConfig) -> Result<Vec<Question>, GeneratorError>;
}

//
// ─── LLM-BACKED GENERATOR ──────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeneratorConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Generates questions through an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct LlmQuestionGenerator {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl LlmQuestionGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeneratorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GeneratorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn complete(&self, quiz: &QuizConfig) -> Result<String, GeneratorError> {
        let config = self.config.as_ref().ok_or(GeneratorError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = CompletionRequest::for_quiz(&config.model, quiz);

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeneratorError::HttpStatus(response.status()));
        }

        let body: CompletionResponse = response.json().await?;
        body.into_text().ok_or(GeneratorError::EmptyResponse)
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, config: &QuizConfig) -> Result<Vec<Question>, GeneratorError> {
        debug!(
            level = %config.level(),
            count = config.quantity_questions(),
            "requesting generated questions"
        );
        let raw = self.complete(config).await?;
        parse_questions(&raw).inspect_err(|err| warn!(%err, "generated questions rejected"))
    }
}

const SYSTEM_PROMPT: &str = "You write multiple-choice math quizzes for employee training. \
     Reply with one JSON object whose \"questions\" field holds the question list, and nothing else.";

/// Builds the user instruction sent to the language model.
#[must_use]
pub fn build_prompt(config: &QuizConfig) -> String {
    let count = config.quantity_questions();
    let level = config.level();
    let themes = config.themes().join(", ");
    format!(
        "Write {count} math questions at the {level} level, set inside an industrial company \
         that manufactures sinks, laundry tanks, and bathroom and kitchen cabinets.\n\
         \n\
         Cover these basic math topics: {themes}.\n\
         \n\
         Rules:\n\
         - Every question must describe a realistic situation at the company \
         (selling tanks, paying for cabinets in installments, the production cost of sinks, and so on).\n\
         - Keep each question short and objective.\n\
         - Give four options and exactly one correct answer, copied verbatim from the options.\n\
         \n\
         Reply with {count} questions in this shape:\n\
         {{\"questions\": [{{\"question\": \"...\", \"options\": [\"...\", \"...\", \"...\", \"...\"], \"answer\": \"...\"}}]}}"
    )
}

/// Parses and validates a model reply into questions.
///
/// Accepts either a `{"questions": [...]}` object or a bare array, optionally
/// wrapped in a Markdown code fence.
///
/// # Errors
///
/// Returns `GeneratorError::Parse` for malformed JSON, `InvalidQuestion` for a
/// question with a bad shape, and `NoQuestions` for an empty list.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, GeneratorError> {
    let reply: QuestionReply = serde_json::from_str(strip_code_fence(raw))?;
    let questions = reply.into_questions();
    if questions.is_empty() {
        return Err(GeneratorError::NoQuestions);
    }
    for (index, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|source| GeneratorError::InvalidQuestion { index, source })?;
    }
    Ok(questions)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionReply {
    Envelope { questions: Vec<Question> },
    Bare(Vec<Question>),
}

impl QuestionReply {
    fn into_questions(self) -> Vec<Question> {
        match self {
            Self::Envelope { questions } | Self::Bare(questions) => questions,
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [PromptMessage; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

impl<'a> CompletionRequest<'a> {
    fn for_quiz(model: &'a str, quiz: &QuizConfig) -> Self {
        Self {
            model,
            messages: [
                PromptMessage {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                PromptMessage {
                    role: Role::User,
                    content: build_prompt(quiz),
                },
            ],
            temperature: 0.7,
            response_format: ResponseFormat::JsonObject,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Debug, Serialize)]
struct PromptMessage {
    role: Role,
    content: String,
}

/// Asks the endpoint for a syntactically valid JSON object.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonObject,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    /// Text of the first choice, if it has any.
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

//
// ─── SCRIPTED GENERATOR ────────────────────────────────────────────────────────
//

/// In-memory generator that replays queued results, for demos and tests.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    replies: Arc<Mutex<VecDeque<Result<Vec<Question>, String>>>>,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    #[must_use]
    pub fn with_questions(self, questions: Vec<Question>) -> Self {
        self.push(Ok(questions));
        self
    }

    /// Queue a failing reply carrying raw model output that will not parse.
    #[must_use]
    pub fn with_failure(self, raw: impl Into<String>) -> Self {
        self.push(Err(raw.into()));
        self
    }

    fn push(&self, reply: Result<Vec<Question>, String>) {
        if let Ok(mut guard) = self.replies.lock() {
            guard.push_back(reply);
        }
    }
}

#[async_trait]
impl QuestionGenerator for ScriptedGenerator {
    async fn generate(&self, _config: &QuizConfig) -> Result<Vec<Question>, GeneratorError> {
        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut guard| guard.pop_front());
        match next {
            Some(Ok(questions)) => Ok(questions),
            Some(Err(raw)) => parse_questions(&raw),
            None => Err(GeneratorError::Disabled),
        }
    }
}

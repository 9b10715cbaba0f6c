use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizConfigError {
    #[error("select at least one theme")]
    NoThemes,

    #[error("question count must be between {min} and {max}, got {got}")]
    InvalidQuantity { got: u32, min: u32, max: u32 },

    #[error("timer must be between {min} and {max} minutes, got {got}")]
    InvalidTimerMinutes { got: u32, min: u32, max: u32 },

    #[error("unknown level: {0}")]
    UnknownLevel(String),
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty requested from the question generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = QuizConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(QuizConfigError::UnknownLevel(other.to_string())),
        }
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Accepted range for the number of questions in one quiz.
pub const QUANTITY_RANGE: (u32, u32) = (3, 5);

/// Accepted range for the per-question timer, in minutes.
pub const TIMER_MINUTES_RANGE: (u32, u32) = (1, 5);

/// Settings chosen before a quiz starts.
///
/// Fixed for the lifetime of a session once applied to the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    level: Level,
    themes: Vec<String>,
    quantity_questions: u32,
    timer_minutes: u32,
}

impl QuizConfig {
    /// Creates a validated configuration.
    ///
    /// Blank themes are dropped and duplicates removed, keeping first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `QuizConfigError` when no theme remains or a count is out of bounds.
    pub fn new<I, S>(
        level: Level,
        themes: I,
        quantity_questions: u32,
        timer_minutes: u32,
    ) -> Result<Self, QuizConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for theme in themes {
            let theme = theme.into().trim().to_string();
            if !theme.is_empty() && !unique.contains(&theme) {
                unique.push(theme);
            }
        }
        if unique.is_empty() {
            return Err(QuizConfigError::NoThemes);
        }

        let (min, max) = QUANTITY_RANGE;
        if !(min..=max).contains(&quantity_questions) {
            return Err(QuizConfigError::InvalidQuantity {
                got: quantity_questions,
                min,
                max,
            });
        }

        let (min, max) = TIMER_MINUTES_RANGE;
        if !(min..=max).contains(&timer_minutes) {
            return Err(QuizConfigError::InvalidTimerMinutes {
                got: timer_minutes,
                min,
                max,
            });
        }

        Ok(Self {
            level,
            themes: unique,
            quantity_questions,
            timer_minutes,
        })
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    #[must_use]
    pub fn quantity_questions(&self) -> u32 {
        self.quantity_questions
    }

    #[must_use]
    pub fn timer_minutes(&self) -> u32 {
        self.timer_minutes
    }
}

impl Default for QuizConfig {
    /// The empty configuration a fresh session starts with.
    fn default() -> Self {
        Self {
            level: Level::Easy,
            themes: Vec::new(),
            quantity_questions: QUANTITY_RANGE.0,
            timer_minutes: TIMER_MINUTES_RANGE.0,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

//! Recorded conversation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of turn timestamps: `DD-MM-YYYY_HH:MM:SS:ffffff`.
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H:%M:%S:%6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Chatbot,
}

impl Speaker {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Chatbot => "chatbot",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a turn: a single answer or an ordered list of answers.
///
/// Serialized untagged so the store sees either a JSON string or a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Single(String),
    Many(Vec<String>),
}

impl From<String> for TurnContent {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for TurnContent {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

/// One recorded exchange. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user_id: String,
    pub session_id: String,
    pub speaker: Speaker,
    pub content: TurnContent,
    pub timestamp: String,
}

impl Turn {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        speaker: Speaker,
        content: impl Into<TurnContent>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            speaker,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }
}

#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time in turn timestamp layout.
#[must_use]
pub fn timestamp_now() -> String {
    format_timestamp(Utc::now())
}

//! Question, answer and vote shapes.

use std::fmt;

use chrono::{DateTime, Utc};
use database::validation::validate_model_id;
use database::{ChatHistory, ModelResponses};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError};

/// How a question is answered: by every active model, or by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChatMode {
    /// Fan out to every active model and compare.
    #[default]
    Debate,
    /// Ask a single model, bypassing the fan-out.
    Model(String),
}

impl ChatMode {
    /// Wire value of [`ChatMode::Debate`].
    pub const DEBATE: &'static str = "debate";

    pub fn as_str(&self) -> &str {
        match self {
            ChatMode::Debate => Self::DEBATE,
            ChatMode::Model(id) => id,
        }
    }

    pub fn is_debate(&self) -> bool {
        matches!(self, ChatMode::Debate)
    }
}

impl From<String> for ChatMode {
    fn from(value: String) -> Self {
        if value == Self::DEBATE {
            ChatMode::Debate
        } else {
            ChatMode::Model(value)
        }
    }
}

impl From<ChatMode> for String {
    fn from(mode: ChatMode) -> Self {
        match mode {
            ChatMode::Debate => ChatMode::DEBATE.to_string(),
            ChatMode::Model(id) => id,
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question against one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub collection_id: i64,
    pub query: String,
    #[serde(default)]
    pub mode: ChatMode,
}

impl Validate for ChatRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::Empty("query".to_string()));
        }
        match &self.mode {
            ChatMode::Debate => Ok(()),
            ChatMode::Model(id) => validate_model_id(id),
        }
    }
}

/// Names the winning model for a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub chat_id: i64,
    /// Any model id.
    pub winner: String,
}

impl Validate for VoteRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_model_id(&self.winner)
    }
}

/// Vote cast on a blinded comparison; the server resolves the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindVoteRequest {
    pub chat_id: i64,
}

impl Validate for BlindVoteRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: i64,
    pub question: String,
    #[serde(default)]
    pub final_answer: Option<String>,
    #[serde(default)]
    pub llm_responses: Option<ModelResponses>,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatHistory> for ChatResponse {
    fn from(chat: &ChatHistory) -> Self {
        Self {
            id: chat.id,
            question: chat.question.clone(),
            final_answer: chat.final_answer.clone(),
            llm_responses: chat.responses().cloned(),
            timestamp: chat.timestamp,
        }
    }
}

//! Database models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::validation::ValidationError;

/// Answers keyed by the model identifier that produced them.
pub type ModelResponses = BTreeMap<String, String>;

/// API keys keyed by provider name (`google`, `openai`, ...).
pub type ProviderKeys = BTreeMap<String, String>;

/// An account. Owns collections, documents and chats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Login email, unique across the table.
    pub email: String,
    /// Password hash. The plaintext is never stored.
    pub hashed_password: String,
    /// Whether the user may change system settings.
    pub is_admin: bool,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub is_admin: bool,
}

/// A named set of documents belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Collection {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Owning user.
    pub user_id: i64,
    /// Set by the store on insert.
    pub created_at: DateTime<Utc>,
}

/// Ingestion state of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentStatus {
    #[default]
    Pending,
    Processing,
    Ready,
    Failed,
}

impl DocumentStatus {
    /// Every accepted status, in pipeline order.
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Pending,
        DocumentStatus::Processing,
        DocumentStatus::Ready,
        DocumentStatus::Failed,
    ];

    /// Value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Failed => "failed",
        }
    }

    /// Parse a stored or user-supplied status.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DocumentStatus::Pending),
            "processing" => Ok(DocumentStatus::Processing),
            "ready" => Ok(DocumentStatus::Ready),
            "failed" => Ok(DocumentStatus::Failed),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded file. The collection link is optional, the owner is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Original file name.
    pub filename: String,
    /// File type as reported at upload (e.g., "pdf").
    pub file_type: Option<String>,
    /// One of [`DocumentStatus`], stored as text.
    pub status: String,
    /// Owning user.
    pub user_id: i64,
    /// Collection the document was uploaded into, if any.
    pub collection_id: Option<i64>,
}

impl Document {
    /// Typed view of `status`.
    pub fn status(&self) -> Result<DocumentStatus, ValidationError> {
        DocumentStatus::parse(&self.status)
    }
}

/// Fields needed to insert a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub filename: String,
    pub file_type: Option<String>,
    pub user_id: i64,
    pub collection_id: Option<i64>,
}

/// One question asked against a collection, with every model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatHistory {
    /// Auto-incrementing ID.
    pub id: i64,
    /// User who asked.
    pub user_id: i64,
    /// Collection the question was asked against.
    pub collection_id: i64,
    /// Question text.
    pub question: String,
    /// Retrieved supporting text.
    pub context: Option<String>,
    /// Answer per model id, once the fan-out completes.
    pub llm_responses: Option<Json<ModelResponses>>,
    /// Selected answer.
    pub final_answer: Option<String>,
    /// Set by the store on insert.
    pub timestamp: DateTime<Utc>,
}

impl ChatHistory {
    /// Borrow the model responses without the JSON wrapper.
    pub fn responses(&self) -> Option<&ModelResponses> {
        self.llm_responses.as_ref().map(|json| &json.0)
    }
}

/// Fields needed to insert a chat record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChat {
    pub user_id: i64,
    pub collection_id: i64,
    pub question: String,
    pub context: Option<String>,
}

/// The winning model for one chat. At most one per chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Vote {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Chat the vote was cast on.
    pub chat_id: i64,
    /// Winning model id (e.g., "gemini-1.5-flash").
    pub winner: String,
    /// User who voted.
    pub user_id: i64,
}

/// Process-wide settings row. There is only ever one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SystemSettings {
    /// Always [`SystemSettings::SINGLETON_ID`].
    pub id: i64,
    /// API key per provider name.
    pub api_keys: Json<ProviderKeys>,
    /// Models queried in debate mode, in order.
    pub active_models: Json<Vec<String>>,
}

impl SystemSettings {
    /// Primary key of the settings row.
    pub const SINGLETON_ID: i64 = 1;
}

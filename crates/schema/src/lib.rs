//! API boundary shapes.
//!
//! Inbound shapes implement [`Validate`]; use [`parse_json`] to deserialize
//! and validate in one step so nothing invalid reaches the entity layer.
//! Outbound shapes are built straight from entity references with `From`.

pub mod chat;
pub mod collection;
pub mod document;
pub mod error;
pub mod settings;
pub mod user;

pub use chat::{BlindVoteRequest, ChatMode, ChatRequest, ChatResponse, VoteRequest};
pub use collection::{CollectionCreate, CollectionOut, CollectionUpdate};
pub use document::{DocumentOut, DocumentStatusUpdate};
pub use error::SchemaError;
pub use settings::{SystemSettingsOut, SystemSettingsUpdate};
pub use user::{UserCreate, UserOut, UserUpdate};

pub use database::ValidationError;

use serde::de::DeserializeOwned;

/// Checks an inbound shape before it is turned into an entity.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Deserialize a JSON request body and validate it.
pub fn parse_json<T>(body: &str) -> Result<T, SchemaError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body)?;
    value.validate()?;
    Ok(value)
}

//! Collection shapes.

use chrono::{DateTime, Utc};
use database::validation::validate_name;
use database::Collection;
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionCreate {
    pub name: String,
}

impl Validate for CollectionCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

impl Validate for CollectionUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        match &self.name {
            Some(name) => validate_name("name", name),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionOut {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Collection> for CollectionOut {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id,
            name: collection.name.clone(),
            created_at: Some(collection.created_at),
        }
    }
}

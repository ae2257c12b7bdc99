//! Document shapes.

use database::{Document, DocumentStatus};
use serde::{Deserialize, Serialize};

use crate::{Validate, ValidationError};

/// Document as listed to clients.
///
/// `file_type` is always present on the wire; an unknown type is sent as an
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOut {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    pub status: String,
}

impl From<&Document> for DocumentOut {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            file_type: doc.file_type.clone().unwrap_or_default(),
            status: doc.status.clone(),
        }
    }
}

/// Status change reported by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentStatusUpdate {
    pub status: String,
}

impl DocumentStatusUpdate {
    /// Typed status; call after [`Validate::validate`] has passed.
    pub fn status(&self) -> Result<DocumentStatus, ValidationError> {
        DocumentStatus::parse(&self.status)
    }
}

impl Validate for DocumentStatusUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        self.status().map(|_| ())
    }
}

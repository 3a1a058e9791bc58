use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::CourseId;

/// Per-field validation messages, keyed by the wire name of the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns true if no field has failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded against a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Merges another report into this one.
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Converts the report into a result, failing if any field was recorded.
    pub fn into_result(self) -> std::result::Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors that can occur when interacting with the course store.
#[derive(Debug, Error)]
pub enum CourseStoreError {
    /// No course exists with the given EID.
    #[error("Course not found: {0}")]
    NotFound(CourseId),

    /// A record failed field validation.
    #[error("Invalid course: {0}")]
    Validation(FieldErrors),

    /// The configured table schema is not a plain SQL identifier.
    #[error("Invalid table schema name: {0:?}")]
    InvalidSchema(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for course store operations.
pub type Result<T> = std::result::Result<T, CourseStoreError>;

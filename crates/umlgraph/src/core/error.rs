//! Core error types for diagram editing
//!
//! Every fallible model or store operation returns a [`DiagramError`]. An
//! operation that fails leaves the diagram exactly as it was.

use std::fmt;

use thiserror::Error;

use crate::model::InvariantViolation;

/// Kind of indexed entity inside a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Attribute,
    Method,
    Parameter,
    Relation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Attribute => write!(f, "attribute"),
            EntityKind::Method => write!(f, "method"),
            EntityKind::Parameter => write!(f, "parameter"),
            EntityKind::Relation => write!(f, "relation"),
        }
    }
}

/// Core error types for diagram editing and (de)serialization
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Invalid reference from '{source_id}' to '{target_id}': {reason}")]
    InvalidReference {
        source_id: String,
        target_id: String,
        reason: String,
    },

    #[error("Index out of range: {entity} {index} (length {len})")]
    IndexOutOfRange {
        entity: EntityKind,
        index: usize,
        len: usize,
    },

    #[error("Class not found: {class_id}")]
    NotFound { class_id: String },

    #[error("Invalid encoding for {field}: {value}")]
    InvalidEncoding { field: &'static str, value: String },

    #[error("Invariant violation: {}", describe_violations(.violations))]
    InvariantViolation { violations: Vec<InvariantViolation> },

    #[error("Deserialization error: {source}")]
    Deserialize {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

/// Result type used by the model and the store
pub type DiagramResult<T> = std::result::Result<T, DiagramError>;

fn describe_violations(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DiagramError {
    /// Create an invalid reference error
    pub fn invalid_reference(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidReference {
            source_id: source_id.into(),
            target_id: target_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an index out of range error
    pub fn index_out_of_range(entity: EntityKind, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { entity, index, len }
    }

    /// Create a not found error
    pub fn not_found(class_id: impl Into<String>) -> Self {
        Self::NotFound {
            class_id: class_id.into(),
        }
    }

    /// Create an invalid encoding error
    pub fn invalid_encoding(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidEncoding {
            field,
            value: value.to_string(),
        }
    }

    /// Returns true if this error is an [`DiagramError::InvalidReference`]
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, DiagramError::InvalidReference { .. })
    }

    /// Returns true if this error is an [`DiagramError::IndexOutOfRange`]
    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self, DiagramError::IndexOutOfRange { .. })
    }

    /// Returns true if this error is a [`DiagramError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiagramError::NotFound { .. })
    }
}

/// Fail with `IndexOutOfRange` unless `index < len`
pub(crate) fn check_index(entity: EntityKind, index: usize, len: usize) -> DiagramResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(DiagramError::index_out_of_range(entity, index, len))
    }
}

//! Error taxonomy for the card core
//!
//! Graph-level inconsistencies are not errors; they are reported as
//! [`ValidationIssue`](crate::graph::ValidationIssue) values.

use thiserror::Error;

/// Errors surfaced by the graph service and version history
#[derive(Debug, Error)]
pub enum CardError {
    /// A card, asset, binding or version that must exist does not
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A caller-supplied argument violates a precondition
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// I/O failure from a persistence collaborator, propagated unchanged
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl CardError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type CardResult<T> = std::result::Result<T, CardError>;

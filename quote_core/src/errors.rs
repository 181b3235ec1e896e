//! # Error Types
//!
//! Structured error types for quote_core. Lookup misses and out-of-range
//! quantities are *not* errors (they normalize per the pricing rules);
//! these variants cover operations that genuinely cannot proceed.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::errors::{EstimateError, EstimateResult};
//!
//! fn validate_length(length_m: f64) -> EstimateResult<()> {
//!     if length_m <= 0.0 {
//!         return Err(EstimateError::InvalidInput {
//!             field: "length_m".to_string(),
//!             value: length_m.to_string(),
//!             reason: "Booth length must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for quote_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Structured error type for estimation and export operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by callers and front ends.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A mutation referenced a group id that is not in the project
    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: String },

    /// A mutation referenced a line item id not present in the group
    #[error("Item not found: {item_id} in group {group_id}")]
    ItemNotFound { group_id: String, item_id: String },

    /// An archive operation referenced an unknown project id
    #[error("Project not found in archive: {project_id}")]
    ProjectNotFound { project_id: String },

    /// Storage I/O error
    #[error("Storage error: {operation} on '{path}' - {reason}")]
    StorageError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Data store is locked by another user/process
    #[error("Store locked: '{path}' is locked by {locked_by} since {locked_at}")]
    StoreLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch in a persisted file
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Proposal PDF compilation or rendering failed
    #[error("PDF generation failed: {reason}")]
    PdfGeneration { reason: String },

    /// The AI suggestion call failed (network, API, or malformed response)
    #[error("Suggestion failed: {reason}")]
    SuggestionFailed { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a GroupNotFound error
    pub fn group_not_found(group_id: impl Into<String>) -> Self {
        EstimateError::GroupNotFound {
            group_id: group_id.into(),
        }
    }

    /// Create an ItemNotFound error
    pub fn item_not_found(group_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        EstimateError::ItemNotFound {
            group_id: group_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Create a ProjectNotFound error
    pub fn project_not_found(project_id: impl Into<String>) -> Self {
        EstimateError::ProjectNotFound {
            project_id: project_id.into(),
        }
    }

    /// Create a StorageError
    pub fn storage_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::StorageError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreLocked error
    pub fn store_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        EstimateError::StoreLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a PdfGeneration error
    pub fn pdf_generation(reason: impl Into<String>) -> Self {
        EstimateError::PdfGeneration {
            reason: reason.into(),
        }
    }

    /// Create a SuggestionFailed error
    pub fn suggestion_failed(reason: impl Into<String>) -> Self {
        EstimateError::SuggestionFailed {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry or proceed without)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EstimateError::StoreLocked { .. } | EstimateError::SuggestionFailed { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::GroupNotFound { .. } => "GROUP_NOT_FOUND",
            EstimateError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            EstimateError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            EstimateError::StorageError { .. } => "STORAGE_ERROR",
            EstimateError::StoreLocked { .. } => "STORE_LOCKED",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::VersionMismatch { .. } => "VERSION_MISMATCH",
            EstimateError::PdfGeneration { .. } => "PDF_GENERATION",
            EstimateError::SuggestionFailed { .. } => "SUGGESTION_FAILED",
            EstimateError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

//! Unified error type for the Share In service.
//!
//! Business operations return [`Result`]; the API layer turns each variant into
//! an HTTP status (see `api::error`).

use thiserror::Error;

/// All errors produced by configuration, business logic, and persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input failed a business validation rule
    #[error("Validation failed: {message}")]
    Validation {
        /// Which rule failed
        message: String,
    },

    /// A monetary amount was zero, negative, or not finite where that is not allowed
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"customer"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A human-readable code or unique name is already taken
    #[error("{entity} with code '{code}' already exists")]
    DuplicateCode {
        /// Entity kind
        entity: &'static str,
        /// The duplicated code or name
        code: String,
    },

    /// Row cannot be deleted while other rows reference it
    #[error("Cannot delete {entity} {id}: referenced by {dependents}")]
    HasDependents {
        /// Entity kind
        entity: &'static str,
        /// Identifier of the row
        id: i64,
        /// Description of the referencing rows
        dependents: String,
    },

    /// A status change that the workflow does not allow
    #[error("Cannot change {entity} status from '{from}' to '{to}'")]
    InvalidStatusTransition {
        /// Entity kind
        entity: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A capital movement would leave a partner with negative capital
    #[error("Insufficient capital for partner {partner_id}: available {available:.2}, required {required:.2}")]
    InsufficientCapital {
        /// Partner whose capital is short
        partner_id: i64,
        /// Current capital
        available: f64,
        /// Amount the operation needs
        required: f64,
    },

    /// The request conflicts with existing state
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Missing or wrong bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

//! Error types and error handling
//!
//! Two families of failure exist. Programmer errors (an inline whose
//! relationship cannot be resolved, a schema that references unknown fields)
//! are returned as [`CrudError`] as soon as they are detected. User-input
//! errors never abort a form; they accumulate per field in
//! [`crate::forms::ValidationErrors`].

use thiserror::Error;

/// Failure to map a parent schema onto a child schema through a relationship
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The parent has no relationship targeting the child
    #[error("no relationship found from '{parent}' to '{child}'")]
    NotFound {
        /// Parent entity name
        parent: String,
        /// Child entity name
        child: String,
    },

    /// The parent has several relationships targeting the child
    #[error(
        "multiple relationships found from '{parent}' to '{child}' ({candidates:?}); \
         specify `relationship_name` explicitly"
    )]
    Ambiguous {
        /// Parent entity name
        parent: String,
        /// Child entity name
        child: String,
        /// Every matching relationship name, in declaration order
        candidates: Vec<String>,
    },
}

/// Framework error type
#[derive(Debug, Error)]
pub enum CrudError {
    /// Relationship resolution failed
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Object-dependent state was read on a form without a bound record
    #[error("form '{form}' has no bound object")]
    Unbound {
        /// Name of the form
        form: String,
    },

    /// A field name is not declared on the entity
    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField {
        /// Entity name
        entity: String,
        /// Offending field name
        field: String,
    },

    /// A relationship name is not declared on the entity
    #[error("entity '{entity}' has no relationship '{relationship}'")]
    UnknownRelationship {
        /// Entity name
        entity: String,
        /// Offending relationship name
        relationship: String,
    },

    /// An existing inline row no longer has its child attached to the parent
    #[error("existing child {index} of relationship '{relationship}' is not attached")]
    DetachedChild {
        /// Relationship the row belongs to
        relationship: String,
        /// Position the child had when the form was bound
        index: usize,
    },

    /// Invalid schema or form definition
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Result alias used across the crate
pub type Result<T, E = CrudError> = std::result::Result<T, E>;

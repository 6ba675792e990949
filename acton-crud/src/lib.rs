//! acton-crud: schema-driven model forms with inline child forms
//!
//! Binds HTML form submissions to an entity and its one-to-many children for
//! administrative CRUD interfaces. One submission carries the parent's fields
//! and any number of child rows; the form discovers the rows, validates them,
//! and writes the whole graph back into an in-memory [`record::Record`].
//!
//! # Design Principles
//!
//! 1. **Definitions at startup**: schemas and form specs are built once, and
//!    inline relationships are resolved before the first request
//! 2. **Request-scoped forms**: a [`forms::ModelForm`] lives for one request and
//!    never touches persistence
//! 3. **Errors are values**: conversion and validator failures are collected per
//!    field instead of aborting the request
//!
//! # Quick Start
//!
//! ```rust
//! use acton_crud::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let parent = EntitySchema::builder("Parent")
//!     .field("id:integer:pk")
//!     .field("name:string")
//!     .relationship("children", "Child")
//!     .build()?;
//! let child = EntitySchema::builder("Child")
//!     .field("id:integer:pk")
//!     .field("parent_id:references:Parent")
//!     .field("text:string")
//!     .build()?;
//!
//! let spec = FormSpec::builder(parent.clone())
//!     .inline(InlineSpec::new(FormSpec::builder(child).build()?))
//!     .build()?;
//!
//! let posted = PostedData::from_pairs([
//!     ("name", "Acme"),
//!     ("child_count", "2"),
//!     ("child_0_text", "a"),
//!     ("child_1_text", "b"),
//! ]);
//!
//! let mut form = ModelForm::new(&spec, FormInit::new().posted(&posted))?;
//! assert!(form.validate());
//!
//! let mut record = Record::new(parent);
//! form.populate_obj(&mut record)?;
//! assert_eq!(record.get("name"), Some(&Value::from("Acme")));
//! assert_eq!(record.children("children")?.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`schema`]: entity schemas, field types, validators
//! - [`record`]: bound objects and their values
//! - [`forms`]: form specs, model forms, inline form sets
//! - [`extractors`]: axum extractor for submissions
//! - [`config`]: figment-based configuration
//! - [`observability`]: `tracing` subscriber setup

pub mod config;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod observability;
pub mod record;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_crud::prelude::*;
    //! ```

    // Schema
    pub use crate::schema::{EntitySchema, FieldDefinition, FieldType, FieldValidator};

    // Records
    pub use crate::record::{Record, Value};

    // Form handling
    pub use crate::forms::{
        FieldError, FormInit, FormSpec, InlineFormSet, InlineSpec, ModelForm, PostedData,
        ValidationErrors,
    };

    // Extractors
    pub use crate::extractors::PostedForm;

    // Configuration
    pub use crate::config::{CrudConfig, FormSettings};

    // Error types
    pub use crate::error::{CrudError, ResolutionError};

    // Re-export key dependencies
    pub use axum;
    pub use validator;
}

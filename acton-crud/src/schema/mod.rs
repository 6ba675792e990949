//! Entity schemas: fields, primary keys, relationships
//!
//! ```rust
//! use acton_crud::schema::{EntitySchema, FieldValidator, SchemaRegistry};
//!
//! let parent = EntitySchema::builder("Parent")
//!     .field("id:integer:pk")
//!     .field("name:string:required")
//!     .relationship("children", "Child")
//!     .build()?;
//! let child = EntitySchema::builder("Child")
//!     .field("id:integer:pk")
//!     .field("parent_id:references:Parent")
//!     .field("text:text")
//!     .validator("text", FieldValidator::Length { min: None, max: Some(500) })
//!     .build()?;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(parent)?;
//! registry.register(child)?;
//! registry.check_relationships()?;
//! # Ok::<(), acton_crud::error::CrudError>(())
//! ```

mod entity;
mod field_type;
mod registry;
mod validators;

pub use entity::{EntitySchema, EntitySchemaBuilder, Relationship};
pub use field_type::{FieldDefinition, FieldType, InputType};
pub use registry::SchemaRegistry;
pub use validators::FieldValidator;

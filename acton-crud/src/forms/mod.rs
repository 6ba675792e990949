//! Model forms with inline child forms
//!
//! This module binds an entity's scalar fields and its one-to-many children
//! to a single HTML form submission:
//! - [`FormSpec`] describes a form once, at startup, and resolves every inline
//!   relationship up front
//! - [`ModelForm`] binds posted data, an existing [`Record`](crate::record::Record)
//!   or initial values, in that order of precedence
//! - [`InlineFormSet`] discovers child rows from the `<name>_count` key or from
//!   the bound record's children
//! - [`ModelForm::populate_obj`] writes everything back into the record graph
//!
//! # Quick Start
//!
//! ```rust
//! use acton_crud::forms::{FormInit, FormSpec, InlineSpec, ModelForm, PostedData};
//! use acton_crud::record::Record;
//! use acton_crud::schema::EntitySchema;
//!
//! let parent = EntitySchema::builder("Parent")
//!     .field("id:integer:pk")
//!     .field("name:string:required")
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
//! if form.validate() {
//!     let mut record = Record::new(parent);
//!     form.populate_obj(&mut record)?;
//!     assert_eq!(record.children("children")?.len(), 2);
//! }
//! # Ok::<(), acton_crud::error::CrudError>(())
//! ```
//!
//! # Validation Errors
//!
//! Errors from inline rows are reported under their prefixed keys:
//!
//! ```rust
//! use acton_crud::forms::ValidationErrors;
//!
//! let mut errors = ValidationErrors::new();
//! errors.add("child_1_text", "is required");
//! assert!(errors.has_field_error("child_1_text"));
//! ```

mod binder;
mod error;
mod inline;
mod model_form;
mod posted;
mod resolver;
mod spec;

pub use binder::{BindingSource, BoundField};
pub use error::{FieldError, ValidationErrors};
pub use inline::{InlineFormSet, InlineRow, RowSource};
pub use model_form::{FormInit, FormState, ModelForm};
pub use posted::{KeyFormat, PostedData};
pub use resolver::resolve_relationship;
pub use spec::{Fieldset, FormSpec, FormSpecBuilder, Inline, InlineSpec};

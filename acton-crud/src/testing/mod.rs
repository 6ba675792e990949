//! Shared fixtures for unit tests
//!
//! `Parent { id, name }` owns `children: Vec<Child>`, and
//! `Child { id, parent_id, text }` points back at it. `GenericModel` has one
//! field of each common scalar type and no relationships.

use std::sync::Arc;

use crate::forms::{FormSpec, InlineSpec, PostedData};
use crate::schema::EntitySchema;

pub fn parent_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Parent")
        .field("id:integer:pk")
        .field("name:string")
        .relationship("children", "Child")
        .build()
        .unwrap()
}

pub fn child_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Child")
        .field("id:integer:pk")
        .field("parent_id:references:Parent")
        .field("text:string")
        .build()
        .unwrap()
}

pub fn generic_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("GenericModel")
        .field("id:integer:pk")
        .field("test_text:string")
        .field("test_int:integer")
        .build()
        .unwrap()
}

pub fn child_form() -> Arc<FormSpec> {
    FormSpec::builder(child_schema()).build().unwrap()
}

pub fn parent_form() -> Arc<FormSpec> {
    FormSpec::builder(parent_schema())
        .inline(InlineSpec::new(child_form()))
        .build()
        .unwrap()
}

pub fn posted(pairs: &[(&str, &str)]) -> PostedData {
    pairs.iter().copied().collect()
}

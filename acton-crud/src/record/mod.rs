//! Bound objects
//!
//! A [`Record`] is the in-memory instance a form reads from and writes to. It
//! is owned by the request handler; forms only mutate it through
//! [`crate::forms::ModelForm::populate_obj`]. A record without values for all
//! of its primary-key fields is *transient*: the persistence layer has not
//! assigned it an identity yet.

mod value;

pub use value::Value;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{CrudError, Result};
use crate::schema::EntitySchema;

/// An entity instance with scalar values and one-to-many child collections
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<EntitySchema>,
    values: BTreeMap<String, Value>,
    relations: BTreeMap<String, Vec<Record>>,
}

impl Record {
    /// Create a transient record with no values and empty collections
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let relations = schema
            .relationships()
            .iter()
            .map(|rel| (rel.name.clone(), Vec::new()))
            .collect();
        Self {
            schema,
            values: BTreeMap::new(),
            relations,
        }
    }

    /// Set a field while building a record
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::UnknownField`] if the schema has no such field.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(field, Some(value.into()))?;
        Ok(self)
    }

    /// The record's schema
    #[must_use]
    pub const fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Entity name
    #[must_use]
    pub fn entity(&self) -> &str {
        self.schema.name()
    }

    /// Current value of a field, `None` when unset or undeclared
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Set or clear a field
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::UnknownField`] if the schema has no such field.
    pub fn set(&mut self, field: &str, value: Option<Value>) -> Result<()> {
        if self.schema.field(field).is_none() {
            return Err(CrudError::UnknownField {
                entity: self.entity().to_string(),
                field: field.to_string(),
            });
        }
        match value {
            Some(value) => {
                self.values.insert(field.to_string(), value);
            }
            None => {
                self.values.remove(field);
            }
        }
        Ok(())
    }

    /// Children attached through `relationship`
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::UnknownRelationship`] if the schema has no such
    /// relationship.
    pub fn children(&self, relationship: &str) -> Result<&[Self]> {
        self.relations
            .get(relationship)
            .map(Vec::as_slice)
            .ok_or_else(|| self.unknown_relationship(relationship))
    }

    /// Mutable access to the collection behind `relationship`
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::UnknownRelationship`] if the schema has no such
    /// relationship.
    pub fn children_mut(&mut self, relationship: &str) -> Result<&mut Vec<Self>> {
        let schema = Arc::clone(&self.schema);
        self.relations
            .get_mut(relationship)
            .ok_or_else(|| CrudError::UnknownRelationship {
                entity: schema.name().to_string(),
                relationship: relationship.to_string(),
            })
    }

    /// Append `child` to the collection behind `relationship`
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::UnknownRelationship`] if the schema has no such
    /// relationship, or [`CrudError::Schema`] if `child` is not an instance of
    /// the relationship's target entity.
    pub fn attach(&mut self, relationship: &str, child: Self) -> Result<&mut Self> {
        let target = self
            .schema
            .relationship(relationship)
            .map(|rel| rel.target.as_str())
            .ok_or_else(|| self.unknown_relationship(relationship))?;
        if target != child.entity() {
            return Err(CrudError::Schema(format!(
                "relationship '{}.{relationship}' holds '{target}' records, not '{}'",
                self.entity(),
                child.entity()
            )));
        }
        let children = self.children_mut(relationship)?;
        let index = children.len();
        children.push(child);
        Ok(&mut children[index])
    }

    /// Whether any primary-key field is still unset
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.schema
            .primary_keys()
            .any(|pk| !self.values.contains_key(&pk.name))
    }

    fn unknown_relationship(&self, relationship: &str) -> CrudError {
        CrudError::UnknownRelationship {
            entity: self.entity().to_string(),
            relationship: relationship.to_string(),
        }
    }
}

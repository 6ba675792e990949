//! Entity schemas
//!
//! An [`EntitySchema`] is the structural description a form is generated
//! from: scalar fields, primary keys, and one-to-many relationships to other
//! entities. Schemas are built once at startup and shared through [`Arc`].

use std::collections::HashSet;
use std::sync::Arc;

use super::field_type::FieldDefinition;
use super::validators::FieldValidator;
use crate::error::{CrudError, Result};

/// A one-to-many relationship from the owning entity to a target entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Attribute name on the owning entity (e.g., "children")
    pub name: String,
    /// Name of the target entity (e.g., "Child")
    pub target: String,
}

/// Structural description of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    title: Option<String>,
    title_plural: Option<String>,
    fields: Vec<FieldDefinition>,
    relationships: Vec<Relationship>,
}

impl EntitySchema {
    /// Start declaring a schema for the entity `name`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_crud::schema::EntitySchema;
    ///
    /// let parent = EntitySchema::builder("Parent")
    ///     .field("id:integer:pk")
    ///     .field("name:string")
    ///     .relationship("children", "Child")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(parent.primary_keys().count(), 1);
    /// assert_eq!(parent.relationships_to("Child").count(), 1);
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            name: name.into(),
            title: None,
            title_plural: None,
            fields: Vec::new(),
            relationships: Vec::new(),
            pending_validators: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Entity name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit display title, if declared
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Explicit plural display title, if declared
    #[must_use]
    pub fn title_plural(&self) -> Option<&str> {
        self.title_plural.as_deref()
    }

    /// All scalar fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Primary-key fields in declaration order
    pub fn primary_keys(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    /// All relationships in declaration order
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Look up a relationship by attribute name
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Relationships whose target is the entity `target`
    pub fn relationships_to<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.target == target)
    }
}

/// Declarative builder for [`EntitySchema`]
///
/// Declaration mistakes are collected and reported together by
/// [`EntitySchemaBuilder::build`] so the chain never needs `?` midway.
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    name: String,
    title: Option<String>,
    title_plural: Option<String>,
    fields: Vec<FieldDefinition>,
    relationships: Vec<Relationship>,
    pending_validators: Vec<(String, FieldValidator)>,
    errors: Vec<String>,
}

impl EntitySchemaBuilder {
    /// Declare a field from `name:type[:modifier]*` syntax
    #[must_use]
    pub fn field(mut self, definition: &str) -> Self {
        match FieldDefinition::parse(definition) {
            Ok(field) => self.fields.push(field),
            Err(err) => self.errors.push(err.to_string()),
        }
        self
    }

    /// Declare a pre-built field
    #[must_use]
    pub fn field_def(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a validator to a previously or subsequently declared field
    #[must_use]
    pub fn validator(mut self, field: impl Into<String>, validator: FieldValidator) -> Self {
        self.pending_validators.push((field.into(), validator));
        self
    }

    /// Declare a one-to-many relationship named `name` targeting `target`
    #[must_use]
    pub fn relationship(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relationships.push(Relationship {
            name: name.into(),
            target: target.into(),
        });
        self
    }

    /// Override the display title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Override the plural display title
    #[must_use]
    pub fn title_plural(mut self, title_plural: impl Into<String>) -> Self {
        self.title_plural = Some(title_plural.into());
        self
    }

    /// Finish the schema
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Schema`] if a field failed to parse, a field or
    /// relationship name is declared twice (fields and relationships share one
    /// namespace), or a validator targets an undeclared field.
    pub fn build(mut self) -> Result<Arc<EntitySchema>> {
        let mut seen = HashSet::new();
        let names = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.relationships.iter().map(|r| r.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                self.errors.push(format!("'{name}' is declared more than once"));
            }
        }

        for (field_name, validator) in std::mem::take(&mut self.pending_validators) {
            match self.fields.iter_mut().find(|f| f.name == field_name) {
                Some(field) => field.validators.push(validator),
                None => self
                    .errors
                    .push(format!("validator attached to unknown field '{field_name}'")),
            }
        }

        if !self.errors.is_empty() {
            return Err(CrudError::Schema(format!(
                "entity '{}': {}",
                self.name,
                self.errors.join("; ")
            )));
        }

        tracing::trace!(
            entity = %self.name,
            fields = self.fields.len(),
            relationships = self.relationships.len(),
            "entity schema built"
        );

        Ok(Arc::new(EntitySchema {
            name: self.name,
            title: self.title,
            title_plural: self.title_plural,
            fields: self.fields,
            relationships: self.relationships,
        }))
    }
}

//! Explicit entity registry
//!
//! Holds every schema an application declares, keyed by entity name. It is
//! built during startup and passed to whatever needs to look entities up;
//! there is no global instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::entity::EntitySchema;
use crate::error::{CrudError, Result};

/// Mapping from entity name to schema
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Schema`] if an entity with the same name is
    /// already registered.
    pub fn register(&mut self, schema: Arc<EntitySchema>) -> Result<()> {
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(CrudError::Schema(format!(
                "entity '{name}' is already registered"
            )));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Look up a schema by entity name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.get(name).cloned()
    }

    /// Number of registered entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterate over registered schemas in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.schemas.values()
    }

    /// Verify that every relationship target is registered
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Schema`] listing each dangling relationship.
    pub fn check_relationships(&self) -> Result<()> {
        let dangling: Vec<String> = self
            .schemas
            .values()
            .flat_map(|schema| {
                schema
                    .relationships()
                    .iter()
                    .filter(|rel| !self.schemas.contains_key(&rel.target))
                    .map(move |rel| format!("{}.{} -> {}", schema.name(), rel.name, rel.target))
            })
            .collect();

        if dangling.is_empty() {
            Ok(())
        } else {
            Err(CrudError::Schema(format!(
                "relationships target unregistered entities: {}",
                dangling.join(", ")
            )))
        }
    }
}

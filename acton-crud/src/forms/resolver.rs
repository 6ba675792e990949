//! Relationship resolution between a parent and an inline child entity

use crate::error::ResolutionError;
use crate::schema::EntitySchema;

/// Name of the relationship on `parent` that holds `child` records
///
/// An explicit name is returned as is. Otherwise exactly one relationship of
/// `parent` must target `child`.
///
/// # Errors
///
/// Returns [`ResolutionError::NotFound`] when no relationship targets
/// `child`, and [`ResolutionError::Ambiguous`] when several do.
///
/// # Examples
///
/// ```rust
/// use acton_crud::forms::resolve_relationship;
/// use acton_crud::schema::EntitySchema;
///
/// let parent = EntitySchema::builder("Parent")
///     .relationship("children", "Child")
///     .build()?;
/// let child = EntitySchema::builder("Child").build()?;
///
/// assert_eq!(resolve_relationship(&parent, &child, None)?, "children");
/// assert_eq!(resolve_relationship(&parent, &child, Some("kids"))?, "kids");
/// # Ok::<(), acton_crud::error::CrudError>(())
/// ```
pub fn resolve_relationship(
    parent: &EntitySchema,
    child: &EntitySchema,
    explicit: Option<&str>,
) -> Result<String, ResolutionError> {
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }

    let mut candidates = parent.relationships_to(child.name());
    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Ok(only.name.clone()),
        (None, _) => Err(ResolutionError::NotFound {
            parent: parent.name().to_string(),
            child: child.name().to_string(),
        }),
        (Some(_), Some(_)) => Err(ResolutionError::Ambiguous {
            parent: parent.name().to_string(),
            child: child.name().to_string(),
            candidates: parent
                .relationships_to(child.name())
                .map(|r| r.name.clone())
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn parent_with(relationships: &[(&str, &str)]) -> Arc<EntitySchema> {
        relationships
            .iter()
            .fold(EntitySchema::builder("Model"), |builder, (name, target)| {
                builder.relationship(*name, *target)
            })
            .field("id:integer:pk")
            .build()
            .unwrap()
    }

    fn child() -> Arc<EntitySchema> {
        EntitySchema::builder("Model2")
            .field("id:integer:pk")
            .field("model_id:references:Model")
            .build()
            .unwrap()
    }

    #[test]
    fn test_single_match() {
        let parent = parent_with(&[("models", "Model2"), ("others", "Other")]);
        assert_eq!(resolve_relationship(&parent, &child(), None).unwrap(), "models");
    }

    #[test]
    fn test_ambiguous() {
        let parent = parent_with(&[("models", "Model2"), ("more_models", "Model2")]);
        let err = resolve_relationship(&parent, &child(), None).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Ambiguous {
                parent: "Model".to_string(),
                child: "Model2".to_string(),
                candidates: vec!["models".to_string(), "more_models".to_string()],
            }
        );
    }

    #[test]
    fn test_none() {
        let parent = parent_with(&[]);
        assert!(matches!(
            resolve_relationship(&parent, &child(), None),
            Err(ResolutionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_explicit_name_is_unchecked() {
        let parent = parent_with(&[]);
        assert_eq!(
            resolve_relationship(&parent, &child(), Some("some_name")).unwrap(),
            "some_name"
        );
    }
}

//! Form definitions
//!
//! A [`FormSpec`] is the "form type": everything derivable from the schema
//! and configuration is computed once when the spec is built, and the spec is
//! shared through [`Arc`] by every form instance constructed from it.
//! Inline relationships are resolved at build time, so a misconfigured
//! inline fails at startup instead of on the first request.

use convert_case::{Case, Casing};
use std::collections::HashSet;
use std::sync::Arc;

use super::posted::KeyFormat;
use super::resolver::resolve_relationship;
use crate::config::FormSettings;
use crate::error::{CrudError, Result};
use crate::schema::EntitySchema;

/// A display group of fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fieldset {
    /// Group label, `None` for the unlabeled default group
    pub label: Option<String>,
    /// Field names in display order
    pub fields: Vec<String>,
}

impl Fieldset {
    /// Create a fieldset
    #[must_use]
    pub fn new<S: Into<String>>(label: Option<&str>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            label: label.map(ToString::to_string),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// An inline declaration before its relationship is resolved
#[derive(Debug, Clone)]
pub struct InlineSpec {
    form: Arc<FormSpec>,
    relationship_name: Option<String>,
    extra: Option<usize>,
}

impl InlineSpec {
    /// Declare an inline of `form` children
    #[must_use]
    pub const fn new(form: Arc<FormSpec>) -> Self {
        Self {
            form,
            relationship_name: None,
            extra: None,
        }
    }

    /// Name the parent's relationship explicitly instead of resolving it
    #[must_use]
    pub fn relationship_name(mut self, name: impl Into<String>) -> Self {
        self.relationship_name = Some(name.into());
        self
    }

    /// Number of blank rows offered for adding children
    #[must_use]
    pub fn extra(mut self, extra: usize) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// A resolved inline: which child form fills which relationship
#[derive(Debug, Clone)]
pub struct Inline {
    form: Arc<FormSpec>,
    relationship: String,
    extra: usize,
}

impl Inline {
    /// Form used for every child row
    #[must_use]
    pub const fn form(&self) -> &Arc<FormSpec> {
        &self.form
    }

    /// Form-set name, used as the key prefix for its rows
    #[must_use]
    pub fn name(&self) -> &str {
        self.form.name()
    }

    /// Relationship on the parent holding the children
    #[must_use]
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// Number of blank rows offered for adding children
    #[must_use]
    pub const fn extra(&self) -> usize {
        self.extra
    }
}

/// Schema-derived form definition
#[derive(Debug, Clone)]
pub struct FormSpec {
    schema: Arc<EntitySchema>,
    title: String,
    title_plural: String,
    name: String,
    field_names: Vec<String>,
    fieldsets: Vec<Fieldset>,
    inlines: Vec<Inline>,
    keys: KeyFormat,
}

impl FormSpec {
    /// Start a form definition for `schema`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_crud::forms::{FormSpec, InlineSpec};
    /// use acton_crud::schema::EntitySchema;
    ///
    /// let parent = EntitySchema::builder("Parent")
    ///     .field("id:integer:pk")
    ///     .field("name:string")
    ///     .relationship("children", "Child")
    ///     .build()?;
    /// let child = EntitySchema::builder("Child")
    ///     .field("id:integer:pk")
    ///     .field("text:string")
    ///     .build()?;
    ///
    /// let child_form = FormSpec::builder(child).build()?;
    /// let parent_form = FormSpec::builder(parent)
    ///     .inline(InlineSpec::new(child_form).extra(1))
    ///     .build()?;
    ///
    /// assert_eq!(parent_form.title(), "Parent");
    /// assert_eq!(parent_form.title_plural(), "Parents");
    /// assert_eq!(parent_form.field_names(), ["name"]);
    /// assert_eq!(parent_form.inlines()[0].relationship(), "children");
    /// # Ok::<(), acton_crud::error::CrudError>(())
    /// ```
    #[must_use]
    pub fn builder(schema: Arc<EntitySchema>) -> FormSpecBuilder {
        FormSpecBuilder {
            schema,
            title: None,
            title_plural: None,
            name: None,
            only: None,
            exclude: Vec::new(),
            fieldsets: None,
            inlines: Vec::new(),
            settings: FormSettings::default(),
        }
    }

    /// Schema the form is generated from
    #[must_use]
    pub const fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Singular display name
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Plural display name
    #[must_use]
    pub fn title_plural(&self) -> &str {
        &self.title_plural
    }

    /// Lowercase singular identifier
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Editable fields in declaration order
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Display grouping of the fields
    #[must_use]
    pub fn fieldsets(&self) -> &[Fieldset] {
        &self.fieldsets
    }

    /// Resolved inlines in declaration order
    #[must_use]
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Key spelling for prefixed inline fields
    #[must_use]
    pub const fn keys(&self) -> &KeyFormat {
        &self.keys
    }
}

/// Builder for [`FormSpec`]
#[derive(Debug)]
pub struct FormSpecBuilder {
    schema: Arc<EntitySchema>,
    title: Option<String>,
    title_plural: Option<String>,
    name: Option<String>,
    only: Option<Vec<String>>,
    exclude: Vec<String>,
    fieldsets: Option<Vec<Fieldset>>,
    inlines: Vec<InlineSpec>,
    settings: FormSettings,
}

impl FormSpecBuilder {
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

    /// Override the identifier (and with it the inline key prefix)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the form to these fields, in this order
    #[must_use]
    pub fn only<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.only = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Leave these fields out of the form
    #[must_use]
    pub fn exclude<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.exclude.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Replace the default single fieldset
    #[must_use]
    pub fn fieldsets(mut self, fieldsets: Vec<Fieldset>) -> Self {
        self.fieldsets = Some(fieldsets);
        self
    }

    /// Attach an inline child form
    #[must_use]
    pub fn inline(mut self, inline: InlineSpec) -> Self {
        self.inlines.push(inline);
        self
    }

    /// Use loaded settings instead of the defaults
    #[must_use]
    pub fn settings(mut self, settings: &FormSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    /// Finish the form definition
    ///
    /// # Errors
    ///
    /// - [`CrudError::Resolution`] if an inline's relationship cannot be
    ///   resolved
    /// - [`CrudError::UnknownField`] if `only`/`exclude` name undeclared fields
    /// - [`CrudError::Schema`] if two inlines share a form-set name
    pub fn build(self) -> Result<Arc<FormSpec>> {
        let schema = self.schema;
        let unknown = |field: &String| CrudError::UnknownField {
            entity: schema.name().to_string(),
            field: field.clone(),
        };

        if let Some(field) = self
            .only
            .iter()
            .flatten()
            .chain(&self.exclude)
            .find(|f| schema.field(f).is_none())
        {
            return Err(unknown(field));
        }

        let editable: Vec<String> = schema
            .fields()
            .iter()
            .filter(|f| !f.primary_key && !f.is_foreign_key())
            .map(|f| f.name.clone())
            .collect();
        let field_names: Vec<String> = self
            .only
            .unwrap_or_else(|| editable.clone())
            .into_iter()
            .filter(|f| !self.exclude.contains(f))
            .collect();

        let fieldsets = self
            .fieldsets
            .unwrap_or_else(|| vec![Fieldset::new(None, field_names.iter().cloned())]);

        let title = self
            .title
            .or_else(|| schema.title().map(ToString::to_string))
            .unwrap_or_else(|| schema.name().to_case(Case::Title));
        let title_plural = self
            .title_plural
            .or_else(|| schema.title_plural().map(ToString::to_string))
            .unwrap_or_else(|| format!("{title}{}", self.settings.plural_suffix));
        let name = self
            .name
            .unwrap_or_else(|| schema.name().to_case(Case::Snake));

        let mut seen = HashSet::new();
        let mut inlines = Vec::with_capacity(self.inlines.len());
        for inline in self.inlines {
            let relationship = resolve_relationship(
                &schema,
                inline.form.schema(),
                inline.relationship_name.as_deref(),
            )?;
            if !seen.insert(inline.form.name().to_string()) {
                return Err(CrudError::Schema(format!(
                    "form '{name}' declares two inlines named '{}'",
                    inline.form.name()
                )));
            }
            tracing::debug!(
                form = %name,
                inline = %inline.form.name(),
                relationship = %relationship,
                "inline relationship resolved"
            );
            inlines.push(Inline {
                extra: inline.extra.unwrap_or(self.settings.inline_extra),
                form: inline.form,
                relationship,
            });
        }

        Ok(Arc::new(FormSpec {
            keys: KeyFormat::from(&self.settings),
            schema,
            title,
            title_plural,
            name,
            field_names,
            fieldsets,
            inlines,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolutionError;
    use crate::testing::{child_form, child_schema, parent_schema};

    #[test]
    fn test_metadata_defaults() {
        let spec = FormSpec::builder(parent_schema()).build().unwrap();
        assert_eq!(spec.title(), "Parent");
        assert_eq!(spec.title_plural(), "Parents");
        assert_eq!(spec.name(), "parent");
    }

    #[test]
    fn test_humanized_names() {
        let schema = EntitySchema::builder("BlogPost")
            .field("id:integer:pk")
            .build()
            .unwrap();
        let spec = FormSpec::builder(schema).build().unwrap();
        assert_eq!(spec.title(), "Blog Post");
        assert_eq!(spec.title_plural(), "Blog Posts");
        assert_eq!(spec.name(), "blog_post");
    }

    #[test]
    fn test_schema_titles_and_builder_overrides() {
        let schema = EntitySchema::builder("Person")
            .title("Person")
            .title_plural("People")
            .build()
            .unwrap();
        let spec = FormSpec::builder(Arc::clone(&schema)).build().unwrap();
        assert_eq!(spec.title_plural(), "People");

        let spec = FormSpec::builder(schema)
            .title("Member")
            .title_plural("Members of staff")
            .name("member")
            .build()
            .unwrap();
        assert_eq!(spec.title(), "Member");
        assert_eq!(spec.title_plural(), "Members of staff");
        assert_eq!(spec.name(), "member");
    }

    #[test]
    fn test_field_names_skip_keys() {
        let spec = FormSpec::builder(child_schema()).build().unwrap();
        assert_eq!(spec.field_names(), ["text"]);
    }

    #[test]
    fn test_only_and_exclude() {
        let schema = EntitySchema::builder("Generic")
            .field("id:integer:pk")
            .field("a:string")
            .field("b:string")
            .field("c:string")
            .build()
            .unwrap();
        let spec = FormSpec::builder(Arc::clone(&schema))
            .only(["c", "a"])
            .build()
            .unwrap();
        assert_eq!(spec.field_names(), ["c", "a"]);

        let spec = FormSpec::builder(Arc::clone(&schema))
            .exclude(["b"])
            .build()
            .unwrap();
        assert_eq!(spec.field_names(), ["a", "c"]);

        let err = FormSpec::builder(schema).exclude(["zzz"]).build().unwrap_err();
        assert!(matches!(err, CrudError::UnknownField { .. }));
    }

    #[test]
    fn test_default_fieldsets() {
        let spec = FormSpec::builder(parent_schema()).build().unwrap();
        assert_eq!(spec.fieldsets(), [Fieldset::new(None, ["name"])]);

        let empty = EntitySchema::builder("Model")
            .field("id:integer:pk")
            .build()
            .unwrap();
        let spec = FormSpec::builder(empty).build().unwrap();
        assert_eq!(spec.fieldsets(), [Fieldset::new(None, Vec::<String>::new())]);
    }

    #[test]
    fn test_fieldsets_override() {
        let fieldsets = vec![Fieldset::new(Some("Test"), ["test", "foo"])];
        let spec = FormSpec::builder(parent_schema())
            .fieldsets(fieldsets.clone())
            .build()
            .unwrap();
        assert_eq!(spec.fieldsets(), fieldsets.as_slice());
    }

    #[test]
    fn test_inline_resolution_at_build_time() {
        let spec = FormSpec::builder(parent_schema())
            .inline(InlineSpec::new(child_form()))
            .build()
            .unwrap();
        let inline = &spec.inlines()[0];
        assert_eq!(inline.name(), "child");
        assert_eq!(inline.relationship(), "children");
        assert_eq!(inline.extra(), 0);

        let orphan = EntitySchema::builder("Orphan").build().unwrap();
        let err = FormSpec::builder(orphan)
            .inline(InlineSpec::new(child_form()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            CrudError::Resolution(ResolutionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_extra_from_settings_or_inline() {
        let settings = FormSettings {
            inline_extra: 3,
            ..FormSettings::default()
        };
        let spec = FormSpec::builder(parent_schema())
            .settings(&settings)
            .inline(InlineSpec::new(child_form()))
            .build()
            .unwrap();
        assert_eq!(spec.inlines()[0].extra(), 3);

        let spec = FormSpec::builder(parent_schema())
            .settings(&settings)
            .inline(InlineSpec::new(child_form()).extra(1))
            .build()
            .unwrap();
        assert_eq!(spec.inlines()[0].extra(), 1);
    }

    #[test]
    fn test_duplicate_inline_names_rejected() {
        let err = FormSpec::builder(parent_schema())
            .inline(InlineSpec::new(child_form()))
            .inline(InlineSpec::new(child_form()))
            .build()
            .unwrap_err();
        assert!(matches!(err, CrudError::Schema(_)));
    }
}

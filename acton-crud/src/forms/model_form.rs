//! Model forms
//!
//! A [`ModelForm`] is one request-scoped instance of a [`FormSpec`]. It binds
//! its scalar fields on construction, processes every declared inline into an
//! [`InlineFormSet`], and writes everything back into a [`Record`] with
//! [`ModelForm::populate_obj`].

use std::collections::BTreeMap;
use std::sync::Arc;

use super::binder::BoundField;
use super::error::ValidationErrors;
use super::inline::InlineFormSet;
use super::posted::{KeyFormat, PostedData};
use super::spec::{Fieldset, FormSpec};
use crate::error::{CrudError, Result};
use crate::record::{Record, Value};

/// Inputs a form is constructed from
///
/// All inputs are optional. Posted data wins over the bound record, which wins
/// over `extra` initial values. An empty submission counts as no submission,
/// so a GET request with a bound record renders the record's values.
#[derive(Debug, Clone, Default)]
pub struct FormInit<'a> {
    pub(crate) posted: Option<&'a PostedData>,
    pub(crate) object: Option<&'a Record>,
    pub(crate) extra: BTreeMap<String, Value>,
}

impl<'a> FormInit<'a> {
    /// Nothing bound
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a submission
    #[must_use]
    pub fn posted(mut self, posted: &'a PostedData) -> Self {
        self.posted = Some(posted);
        self
    }

    /// Bind an existing record
    #[must_use]
    pub fn object(mut self, object: &'a Record) -> Self {
        self.object = Some(object);
        self
    }

    /// Initial value for `field` when neither posted data nor the record
    /// provide one
    #[must_use]
    pub fn extra(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    /// The submission, if one was made
    pub(crate) fn posted_data(&self) -> Option<&'a PostedData> {
        self.posted.filter(|posted| !posted.is_empty())
    }
}

/// Lifecycle of a form instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Values bound, not yet validated
    Bound,
    /// [`ModelForm::validate`] has run
    Validated,
    /// Values written into a record
    Populated,
}

/// A form instance bound to one request
#[derive(Debug, Clone)]
pub struct ModelForm {
    spec: Arc<FormSpec>,
    keys: KeyFormat,
    prefix: Option<String>,
    fields: Vec<BoundField>,
    inline_fieldsets: Vec<InlineFormSet>,
    primary_keys: Option<Vec<(String, Option<Value>)>>,
    state: FormState,
    errors: ValidationErrors,
}

impl ModelForm {
    /// Construct a top-level form
    ///
    /// # Examples
    ///
    /// ```rust
    /// use acton_crud::forms::{FormInit, FormSpec, InlineSpec, ModelForm, PostedData};
    /// use acton_crud::record::{Record, Value};
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
    /// let spec = FormSpec::builder(parent.clone())
    ///     .inline(InlineSpec::new(FormSpec::builder(child).build()?))
    ///     .build()?;
    ///
    /// let posted = PostedData::from_pairs([
    ///     ("name", "Acme"),
    ///     ("child_count", "1"),
    ///     ("child_0_text", "a"),
    /// ]);
    /// let mut form = ModelForm::new(&spec, FormInit::new().posted(&posted))?;
    /// assert!(form.validate());
    ///
    /// let mut record = Record::new(parent);
    /// form.populate_obj(&mut record)?;
    /// assert_eq!(record.get("name"), Some(&Value::from("Acme")));
    /// assert_eq!(record.children("children")?.len(), 1);
    /// # Ok::<(), acton_crud::error::CrudError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Schema`] if the bound record is not an instance of
    /// the form's entity, or an error from processing an inline.
    pub fn new(spec: &Arc<FormSpec>, init: FormInit<'_>) -> Result<Self> {
        Self::bind(spec, spec.keys(), None, &init)
    }

    /// Construct a form whose keys live under `prefix`
    pub(crate) fn bind(
        spec: &Arc<FormSpec>,
        keys: &KeyFormat,
        prefix: Option<String>,
        init: &FormInit<'_>,
    ) -> Result<Self> {
        let schema = spec.schema();
        if let Some(object) = init.object {
            if object.entity() != schema.name() {
                return Err(CrudError::Schema(format!(
                    "form '{}' cannot bind a '{}' record",
                    spec.name(),
                    object.entity()
                )));
            }
        }

        let posted = init.posted_data();
        let fields = spec
            .field_names()
            .iter()
            .filter_map(|name| schema.field(name))
            .map(|definition| {
                BoundField::bind(
                    definition,
                    keys.join(prefix.as_deref(), &definition.name),
                    posted,
                    init.object,
                    init.extra.get(&definition.name),
                )
            })
            .collect();

        let primary_keys = init.object.map(|object| {
            schema
                .primary_keys()
                .map(|pk| (pk.name.clone(), object.get(&pk.name).cloned()))
                .collect()
        });

        let mut form = Self {
            spec: Arc::clone(spec),
            keys: keys.clone(),
            prefix,
            fields,
            inline_fieldsets: Vec::new(),
            primary_keys,
            state: FormState::Bound,
            errors: ValidationErrors::new(),
        };
        form.process_inline(init)?;
        Ok(form)
    }

    /// Build the form sets of every declared inline
    ///
    /// Called by the constructor; calling it again rebuilds the sets from
    /// `init`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound record lacks an inline's relationship or
    /// a child form cannot be constructed.
    pub fn process_inline(&mut self, init: &FormInit<'_>) -> Result<()> {
        let sets = self
            .spec
            .inlines()
            .iter()
            .map(|inline| InlineFormSet::process(inline, &self.keys, self.prefix.as_deref(), init))
            .collect::<Result<Vec<_>>>()?;
        self.inline_fieldsets = sets;
        Ok(())
    }

    /// Form definition
    #[must_use]
    pub const fn spec(&self) -> &Arc<FormSpec> {
        &self.spec
    }

    /// Singular display name
    #[must_use]
    pub fn title(&self) -> &str {
        self.spec.title()
    }

    /// Plural display name
    #[must_use]
    pub fn title_plural(&self) -> &str {
        self.spec.title_plural()
    }

    /// Lowercase singular identifier
    #[must_use]
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Editable fields in display order
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        self.spec.field_names()
    }

    /// Display grouping of the fields
    #[must_use]
    pub fn fieldsets(&self) -> &[Fieldset] {
        self.spec.fieldsets()
    }

    /// Key prefix, `None` for a top-level form
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Primary-key values of the bound record, in declaration order
    ///
    /// A transient record yields `None` values.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Unbound`] if the form was constructed without a
    /// record.
    pub fn primary_keys(&self) -> Result<&[(String, Option<Value>)]> {
        self.primary_keys
            .as_deref()
            .ok_or_else(|| CrudError::Unbound {
                form: self.spec.name().to_string(),
            })
    }

    /// Whether a record was bound at construction
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.primary_keys.is_some()
    }

    /// Bound scalar fields in display order
    #[must_use]
    pub fn fields(&self) -> &[BoundField] {
        &self.fields
    }

    /// Bound scalar field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&BoundField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Bound value of a field
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.field(name).and_then(BoundField::value)
    }

    /// Processed inline form sets in declaration order
    #[must_use]
    pub fn inline_fieldsets(&self) -> &[InlineFormSet] {
        &self.inline_fieldsets
    }

    /// Processed inline form set by name
    #[must_use]
    pub fn inline(&self, name: &str) -> Option<&InlineFormSet> {
        self.inline_fieldsets.iter().find(|set| set.name() == name)
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    /// JSON view of the bound values, with inline rows under their
    /// relationship name
    #[must_use]
    pub fn data(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for field in &self.fields {
            map.insert(
                field.name().to_string(),
                field.value().map_or(serde_json::Value::Null, Value::to_json),
            );
        }
        for set in &self.inline_fieldsets {
            let rows = set.rows().iter().map(|row| row.form().data()).collect();
            map.insert(set.relationship().to_string(), serde_json::Value::Array(rows));
        }
        serde_json::Value::Object(map)
    }

    /// Run every field's validators, including those of inline rows
    ///
    /// Inline errors are collected under their prefixed keys, so
    /// `child_1_text` points at the second row.
    pub fn validate(&mut self) -> bool {
        let mut errors = ValidationErrors::new();
        for field in &mut self.fields {
            if !field.validate() {
                for error in field.errors() {
                    errors.push(field.key(), error.clone());
                }
            }
        }
        for set in &mut self.inline_fieldsets {
            if !set.validate() {
                errors.merge(set.errors());
            }
        }

        tracing::debug!(form = %self.spec.name(), errors = errors.count(), "form validated");
        self.errors = errors;
        self.state = FormState::Validated;
        !self.errors.has_errors()
    }

    /// Errors from the last [`Self::validate`] call
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Write the bound values into `object`
    ///
    /// Scalar fields are applied first, then every inline form set writes its
    /// rows into `object`'s relationship collections. The form does not
    /// persist anything.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Schema`] if `object` is not an instance of the
    /// form's entity, or any error from populating an inline.
    pub fn populate_obj(&mut self, object: &mut Record) -> Result<()> {
        if object.entity() != self.spec.schema().name() {
            return Err(CrudError::Schema(format!(
                "form '{}' cannot populate a '{}' record",
                self.spec.name(),
                object.entity()
            )));
        }

        for field in &self.fields {
            object.set(field.name(), field.value().cloned())?;
        }
        self.populate_obj_inline(object)?;

        tracing::trace!(form = %self.spec.name(), prefix = ?self.prefix, "record populated");
        self.state = FormState::Populated;
        Ok(())
    }

    /// Write every inline form set's rows into `object`
    ///
    /// # Errors
    ///
    /// Propagates errors from [`InlineFormSet::populate`].
    pub fn populate_obj_inline(&mut self, object: &mut Record) -> Result<()> {
        for set in &mut self.inline_fieldsets {
            set.populate(object)?;
        }
        Ok(())
    }
}

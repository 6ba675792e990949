//! Inline form sets
//!
//! An [`InlineFormSet`] holds the child forms of one parent relationship.
//! Rows come either from a submission (`<name>_count` rows, all new) or from
//! the children already attached to the bound parent (all existing).

use std::sync::Arc;

use super::error::{FieldError, ValidationErrors};
use super::model_form::{FormInit, ModelForm};
use super::posted::{KeyFormat, PostedData};
use super::spec::Inline;
use crate::error::{CrudError, Result};
use crate::record::Record;

/// Where an inline row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    /// Built from the submission; the child does not exist yet
    Posted,
    /// Built from the child at `position` in the parent's collection
    Existing {
        /// Index in the relationship collection at bind time
        position: usize,
    },
}

/// One child form and whether it represents a new child
#[derive(Debug, Clone)]
pub struct InlineRow {
    form: ModelForm,
    source: RowSource,
}

impl InlineRow {
    /// The child form
    #[must_use]
    pub const fn form(&self) -> &ModelForm {
        &self.form
    }

    /// Whether populating this row creates a new child
    #[must_use]
    pub const fn is_new(&self) -> bool {
        matches!(self.source, RowSource::Posted)
    }

    /// Where the row came from
    #[must_use]
    pub const fn source(&self) -> RowSource {
        self.source
    }
}

/// Child forms for one relationship of a parent form
#[derive(Debug, Clone)]
pub struct InlineFormSet {
    inline: Inline,
    keys: KeyFormat,
    prefix: String,
    rows: Vec<InlineRow>,
    count_error: Option<FieldError>,
    errors: ValidationErrors,
}

impl InlineFormSet {
    /// Materialize the rows of `inline`
    ///
    /// With posted data, the row count is read from the inline's count key
    /// (absent or unparsable means zero) and every row is flagged new, even if
    /// a primary key was submitted for it. A count above
    /// [`KeyFormat::max_rows`] builds no rows and leaves an error under the
    /// count key, so the form fails validation. Without posted data, one existing
    /// row is built per child of the bound parent. With neither, the set is
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::UnknownRelationship`] if the bound parent lacks the
    /// inline's relationship, or [`CrudError::Schema`] if a child record does
    /// not match the inline's schema.
    pub fn process(
        inline: &Inline,
        keys: &KeyFormat,
        parent_prefix: Option<&str>,
        init: &FormInit<'_>,
    ) -> Result<Self> {
        let prefix = keys.join(parent_prefix, inline.name());
        let row_prefix = |row: usize| Some(keys.join(Some(&prefix), &row.to_string()));

        let mut count_error = None;
        let rows = if let Some(posted) = init.posted_data() {
            let count_key = keys.count_key(&prefix);
            let mut count = posted
                .get(&count_key)
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if count > keys.max_rows() {
                tracing::warn!(
                    inline = %prefix,
                    rows = count,
                    max_rows = keys.max_rows(),
                    "submitted row count exceeds limit"
                );
                count_error = Some(FieldError::with_code(
                    format!("At most {} rows may be submitted.", keys.max_rows()),
                    "too_many_rows",
                ));
                count = 0;
            }
            let child_init = FormInit {
                posted: Some(posted),
                object: None,
                extra: init.extra.clone(),
            };
            tracing::debug!(inline = %prefix, rows = count, "processing inline rows from posted data");
            (0..count)
                .map(|row| {
                    ModelForm::bind(inline.form(), keys, row_prefix(row), &child_init).map(|form| {
                        InlineRow {
                            form,
                            source: RowSource::Posted,
                        }
                    })
                })
                .collect::<Result<Vec<_>>>()?
        } else if let Some(parent) = init.object {
            let children = parent.children(inline.relationship())?;
            tracing::debug!(inline = %prefix, rows = children.len(), "processing inline rows from bound object");
            children
                .iter()
                .enumerate()
                .map(|(position, child)| {
                    let child_init = FormInit {
                        posted: None,
                        object: Some(child),
                        extra: init.extra.clone(),
                    };
                    ModelForm::bind(inline.form(), keys, row_prefix(position), &child_init).map(
                        |form| InlineRow {
                            form,
                            source: RowSource::Existing { position },
                        },
                    )
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        let mut set = Self {
            inline: inline.clone(),
            keys: keys.clone(),
            prefix,
            rows,
            count_error,
            errors: ValidationErrors::new(),
        };
        set.push_count_error();
        Ok(set)
    }

    /// Write every row into `parent`'s relationship collection
    ///
    /// New rows create a transient child, populate it and append it. Existing
    /// rows populate the child still attached at their original position.
    /// Children missing from the submission are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::DetachedChild`] if an existing row's child is no
    /// longer attached, or any error from populating a child.
    pub fn populate(&mut self, parent: &mut Record) -> Result<()> {
        let relationship = self.inline.relationship().to_string();
        let mut created = 0_usize;

        for row in &mut self.rows {
            match row.source {
                RowSource::Posted => {
                    let mut child = Record::new(Arc::clone(row.form.spec().schema()));
                    row.form.populate_obj(&mut child)?;
                    parent.attach(&relationship, child)?;
                    created += 1;
                }
                RowSource::Existing { position } => {
                    let child = parent
                        .children_mut(&relationship)?
                        .get_mut(position)
                        .ok_or_else(|| CrudError::DetachedChild {
                            relationship: relationship.clone(),
                            index: position,
                        })?;
                    row.form.populate_obj(child)?;
                }
            }
        }

        tracing::debug!(
            inline = %self.prefix,
            relationship = %relationship,
            created,
            updated = self.rows.len() - created,
            "inline rows populated"
        );
        Ok(())
    }

    /// Blank child forms for adding new children, numbered after the
    /// processed rows
    ///
    /// These exist for rendering only; they are never populated.
    ///
    /// # Errors
    ///
    /// Propagates child form construction errors.
    pub fn blank_rows(&self) -> Result<Vec<ModelForm>> {
        let init = FormInit::default();
        (self.rows.len()..self.rows.len() + self.inline.extra())
            .map(|row| {
                let prefix = self.keys.join(Some(&self.prefix), &row.to_string());
                ModelForm::bind(self.inline.form(), &self.keys, Some(prefix), &init)
            })
            .collect()
    }

    /// Primary-key values submitted for `row`, as raw text
    ///
    /// Submitted keys do not make a row existing; this is for callers that
    /// want to look the child up themselves.
    #[must_use]
    pub fn posted_primary_keys(
        &self,
        posted: &PostedData,
        row: usize,
    ) -> Vec<(String, Option<String>)> {
        let row_prefix = self.keys.join(Some(&self.prefix), &row.to_string());
        self.inline
            .form()
            .schema()
            .primary_keys()
            .map(|pk| {
                let key = self.keys.join(Some(&row_prefix), &pk.name);
                (pk.name.clone(), posted.get(&key).map(ToString::to_string))
            })
            .collect()
    }

    /// Validate every row, collecting their errors
    ///
    /// A rejected row count is reported again under the count key.
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        self.push_count_error();
        for row in &mut self.rows {
            if !row.form.validate() {
                self.errors.merge(row.form.errors());
            }
        }
        !self.errors.has_errors()
    }

    fn push_count_error(&mut self) {
        if let Some(error) = &self.count_error {
            let key = self.keys.count_key(&self.prefix);
            self.errors.push(key, error.clone());
        }
    }

    /// Errors from the last [`Self::validate`] call, keyed by prefixed field key
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Form-set name
    #[must_use]
    pub fn name(&self) -> &str {
        self.inline.name()
    }

    /// Display title of the child entity
    #[must_use]
    pub fn title(&self) -> &str {
        self.inline.form().title()
    }

    /// Plural display title of the child entity
    #[must_use]
    pub fn title_plural(&self) -> &str {
        self.inline.form().title_plural()
    }

    /// Relationship on the parent
    #[must_use]
    pub fn relationship(&self) -> &str {
        self.inline.relationship()
    }

    /// Resolved inline definition
    #[must_use]
    pub const fn inline(&self) -> &Inline {
        &self.inline
    }

    /// Key prefix of this set's rows
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key under which the row count is submitted
    #[must_use]
    pub fn count_key(&self) -> String {
        self.keys.count_key(&self.prefix)
    }

    /// Number of blank rows offered for rendering
    #[must_use]
    pub const fn extra(&self) -> usize {
        self.inline.extra()
    }

    /// Rows in order
    #[must_use]
    pub fn rows(&self) -> &[InlineRow] {
        &self.rows
    }

    /// Rows as `(form, is_new)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&ModelForm, bool)> {
        self.rows.iter().map(|row| (&row.form, row.is_new()))
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormSettings;
    use crate::record::Value;
    use crate::testing::{child_schema, parent_form, parent_schema, posted};

    fn inline() -> Inline {
        parent_form().inlines()[0].clone()
    }

    fn process(init: &FormInit<'_>) -> InlineFormSet {
        InlineFormSet::process(&inline(), &KeyFormat::default(), None, init).unwrap()
    }

    fn parent_with_children(texts: &[&str]) -> Record {
        let mut parent = Record::new(parent_schema()).with("id", 1).unwrap();
        for (id, text) in (1_i64..).zip(texts) {
            let child = Record::new(child_schema())
                .with("id", id)
                .unwrap()
                .with("text", *text)
                .unwrap();
            parent.attach("children", child).unwrap();
        }
        parent
    }

    #[test]
    fn test_posted_rows_are_new() {
        let data = posted(&[("child_count", "2"), ("child_0_text", "a"), ("child_1_text", "b")]);
        let set = process(&FormInit::new().posted(&data));

        assert_eq!(set.len(), 2);
        assert!(set.rows().iter().all(InlineRow::is_new));
        assert_eq!(set.rows()[1].form().value("text"), Some(&Value::from("b")));
        assert_eq!(set.rows()[1].form().field("text").unwrap().key(), "child_1_text");
    }

    #[test]
    fn test_posted_rows_with_primary_key_still_new() {
        let data = posted(&[("child_count", "1"), ("child_0_id", "7"), ("child_0_text", "a")]);
        let set = process(&FormInit::new().posted(&data));

        assert!(set.rows()[0].is_new());
        assert_eq!(
            set.posted_primary_keys(&data, 0),
            vec![("id".to_string(), Some("7".to_string()))]
        );
        assert_eq!(
            set.posted_primary_keys(&data, 1),
            vec![("id".to_string(), None)]
        );
    }

    #[test]
    fn test_missing_or_garbage_count_means_zero() {
        let data = posted(&[("name", "Acme"), ("child_0_text", "a")]);
        assert!(process(&FormInit::new().posted(&data)).is_empty());

        let data = posted(&[("child_count", "two")]);
        assert!(process(&FormInit::new().posted(&data)).is_empty());
    }

    #[test]
    fn test_count_above_limit_binds_no_rows() {
        let data = posted(&[("child_count", "2000000"), ("child_0_text", "a")]);
        let mut set = process(&FormInit::new().posted(&data));

        assert!(set.is_empty());
        assert!(set.errors().has_field_error("child_count"));
        assert!(!set.validate());
        assert_eq!(
            set.errors().for_field("child_count")[0].code.as_deref(),
            Some("too_many_rows")
        );
    }

    #[test]
    fn test_count_limit_comes_from_settings() {
        let settings = FormSettings {
            max_inline_rows: 2,
            ..FormSettings::default()
        };
        let keys = KeyFormat::from(&settings);

        let data = posted(&[("child_count", "2"), ("child_0_text", "a"), ("child_1_text", "b")]);
        let mut set =
            InlineFormSet::process(&inline(), &keys, None, &FormInit::new().posted(&data)).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.validate());

        let data = posted(&[("child_count", "3")]);
        let mut set =
            InlineFormSet::process(&inline(), &keys, None, &FormInit::new().posted(&data)).unwrap();
        assert!(set.is_empty());
        assert!(!set.validate());
        assert_eq!(set.errors().fields_with_errors(), vec!["child_count"]);
    }

    #[test]
    fn test_object_rows_are_existing() {
        let parent = parent_with_children(&["a", "b", "c"]);
        let set = process(&FormInit::new().object(&parent));

        assert_eq!(set.len(), 3);
        for (position, row) in set.rows().iter().enumerate() {
            assert!(!row.is_new());
            assert_eq!(row.source(), RowSource::Existing { position });
        }
        assert_eq!(set.rows()[2].form().value("text"), Some(&Value::from("c")));
    }

    #[test]
    fn test_posted_takes_precedence_over_object_children() {
        let parent = parent_with_children(&["a", "b", "c"]);
        let data = posted(&[("child_count", "1"), ("child_0_text", "z")]);
        let set = process(&FormInit::new().posted(&data).object(&parent));

        assert_eq!(set.len(), 1);
        assert!(set.rows()[0].is_new());
    }

    #[test]
    fn test_empty_posted_falls_back_to_object() {
        let parent = parent_with_children(&["a"]);
        let data = PostedData::new();
        let set = process(&FormInit::new().posted(&data).object(&parent));
        assert_eq!(set.len(), 1);
        assert!(!set.rows()[0].is_new());
    }

    #[test]
    fn test_nothing_bound_means_no_rows() {
        assert!(process(&FormInit::new()).is_empty());
    }

    #[test]
    fn test_populate_appends_new_and_updates_existing() {
        let mut parent = parent_with_children(&["a"]);
        let set_from_object = process(&FormInit::new().object(&parent));
        assert_eq!(set_from_object.len(), 1);

        let data = posted(&[("child_count", "1"), ("child_0_text", "new")]);
        let mut set = process(&FormInit::new().posted(&data));
        set.populate(&mut parent).unwrap();

        let children = parent.children("children").unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].get("text"), Some(&Value::from("new")));
        assert!(children[1].is_transient());
    }

    #[test]
    fn test_populate_existing_detached_child_fails() {
        let parent = parent_with_children(&["a", "b"]);
        let mut set = process(&FormInit::new().object(&parent));

        let mut other = parent_with_children(&["only"]);
        let err = set.populate(&mut other).unwrap_err();
        assert!(matches!(err, CrudError::DetachedChild { index: 1, .. }));
    }

    #[test]
    fn test_blank_rows_follow_processed_rows() {
        let parent = parent_with_children(&["a", "b"]);
        let spec = crate::forms::FormSpec::builder(parent_schema())
            .inline(crate::forms::InlineSpec::new(crate::testing::child_form()).extra(2))
            .build()
            .unwrap();
        let set = InlineFormSet::process(
            &spec.inlines()[0],
            spec.keys(),
            None,
            &FormInit::new().object(&parent),
        )
        .unwrap();

        let blanks = set.blank_rows().unwrap();
        assert_eq!(blanks.len(), 2);
        assert_eq!(blanks[0].prefix(), Some("child_2"));
        assert_eq!(blanks[1].field("text").unwrap().key(), "child_3_text");
        assert!(blanks.iter().all(|form| form.value("text").is_none()));
    }

    #[test]
    fn test_metadata() {
        let set = process(&FormInit::new());
        assert_eq!(set.name(), "child");
        assert_eq!(set.title(), "Child");
        assert_eq!(set.title_plural(), "Childs");
        assert_eq!(set.relationship(), "children");
        assert_eq!(set.count_key(), "child_count");
        assert_eq!(set.extra(), 0);
    }
}

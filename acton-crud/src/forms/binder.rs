//! Scalar field binding
//!
//! A field's value is decided once, when the form is constructed:
//! posted data, then the bound record's attribute, then a caller-supplied
//! initial value, then unset.
//!
//! Browsers omit unchecked checkboxes, so a boolean field absent from a
//! non-empty submission binds `false`.

use super::error::FieldError;
use super::posted::PostedData;
use crate::record::{Record, Value};
use crate::schema::{FieldDefinition, FieldType, InputType};

/// Where a bound value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// The submission contained the field's key
    Posted,
    /// The bound record had the attribute
    Object,
    /// A caller-supplied initial value
    Initial,
    /// Nothing provided a value
    Unset,
}

/// A scalar field with its bound value and accumulated errors
#[derive(Debug, Clone, PartialEq)]
pub struct BoundField {
    definition: FieldDefinition,
    key: String,
    value: Option<Value>,
    raw: Option<String>,
    source: BindingSource,
    process_errors: Vec<FieldError>,
    errors: Vec<FieldError>,
}

impl BoundField {
    /// Bind `definition` under `key`
    #[must_use]
    pub fn bind(
        definition: &FieldDefinition,
        key: String,
        posted: Option<&PostedData>,
        object: Option<&Record>,
        initial: Option<&Value>,
    ) -> Self {
        let mut field = Self {
            definition: definition.clone(),
            key,
            value: None,
            raw: None,
            source: BindingSource::Unset,
            process_errors: Vec::new(),
            errors: Vec::new(),
        };

        if let Some(raw) = posted.and_then(|p| p.get(&field.key)) {
            field.source = BindingSource::Posted;
            field.raw = Some(raw.to_string());
            if raw.trim().is_empty() && !definition.field_type.is_textual() {
                return field;
            }
            match definition.field_type.coerce(raw) {
                Ok(value) => field.value = Some(value),
                Err(err) => field.process_errors.push(err),
            }
            field.errors.clone_from(&field.process_errors);
        } else if posted.is_some() && definition.field_type == FieldType::Boolean {
            field.source = BindingSource::Posted;
            field.value = Some(Value::Boolean(false));
        } else if let Some(value) = object.and_then(|o| o.get(&definition.name)) {
            field.source = BindingSource::Object;
            field.value = Some(value.clone());
        } else if let Some(value) = initial {
            field.source = BindingSource::Initial;
            field.value = Some(value.clone());
        }

        field
    }

    /// Field name as declared on the schema
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Submission key, including any inline prefix
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Field definition
    #[must_use]
    pub const fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    /// Bound value
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Raw submitted text, if the value came from posted data
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Where the value came from
    #[must_use]
    pub const fn source(&self) -> BindingSource {
        self.source
    }

    /// Text to render back into the input
    ///
    /// Raw submitted text is preferred so an invalid entry is shown as typed.
    #[must_use]
    pub fn display_value(&self) -> String {
        self.raw
            .clone()
            .or_else(|| self.value.as_ref().map(ToString::to_string))
            .unwrap_or_default()
    }

    /// HTML input hint
    #[must_use]
    pub const fn input_type(&self) -> InputType {
        self.definition.field_type.input_type()
    }

    /// Errors collected so far
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Run the field's validators
    ///
    /// Conversion errors from binding are kept; a field that failed to
    /// convert is not validated further. `Required` stops the chain, and an
    /// optional field without a value skips it entirely.
    pub fn validate(&mut self) -> bool {
        self.errors.clone_from(&self.process_errors);
        if !self.errors.is_empty() {
            return false;
        }

        let blank = match &self.value {
            None => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if self.definition.optional && blank {
            return true;
        }

        for validator in &self.definition.validators {
            if let Err(err) = validator.check(self.value.as_ref()) {
                self.errors.push(err);
                if validator.is_terminal() {
                    break;
                }
            }
        }

        self.errors.is_empty()
    }
}

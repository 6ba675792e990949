//! Field type definitions and parser for entity schemas
//!
//! Fields are declared with a compact `name:type[:modifier]*` syntax so that
//! schemas read like the column list of a migration.
//!
//! # Supported Field Types
//!
//! - `string` / `text` - bound as [`Value::String`]
//! - `integer` / `bigint` - bound as [`Value::Integer`]
//! - `boolean` - bound as [`Value::Boolean`]
//! - `float` / `double` - bound as [`Value::Float`]
//! - `date` - `YYYY-MM-DD`, bound as [`Value::Date`]
//! - `datetime` - `YYYY-MM-DDTHH:MM[:SS]`, bound as [`Value::DateTime`]
//! - `uuid` - bound as [`Value::Uuid`]
//! - `json` - bound as [`Value::Json`]
//! - `references:Model` - foreign key column, bound as [`Value::Integer`]
//! - `enum:Draft,Published` - one of the listed variants, bound as [`Value::String`]
//!
//! # Modifiers
//!
//! - `:pk` / `:primary_key` - part of the primary key
//! - `:optional` - an empty submission is acceptable
//! - `:required` - attaches [`FieldValidator::Required`]
//! - `:unique`, `:indexed` - carried for the persistence layer
//!
//! # Examples
//!
//! ```text
//! id:integer:pk             → primary key, hidden from forms
//! name:string:required      → required text input
//! parent_id:references:Parent → foreign key, hidden from forms
//! status:enum:Draft,Published → select input
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use uuid::Uuid;

use super::validators::FieldValidator;
use crate::error::{CrudError, Result};
use crate::forms::FieldError;
use crate::record::Value;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// A single scalar field of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Field name (e.g., "title", "`parent_id`")
    pub name: String,
    /// Field type
    pub field_type: FieldType,
    /// Whether the field is part of the primary key
    pub primary_key: bool,
    /// Whether an empty submission is acceptable
    pub optional: bool,
    /// Whether field has unique constraint
    pub unique: bool,
    /// Whether field is indexed
    pub indexed: bool,
    /// Field-level validators, run in order
    pub validators: Vec<FieldValidator>,
}

/// Field type enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Single-line text
    String,
    /// Multi-line text
    Text,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// Boolean
    Boolean,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Date (no time)
    Date,
    /// `DateTime` (no timezone)
    DateTime,
    /// UUID
    Uuid,
    /// JSON value
    Json,
    /// Foreign key reference to another model
    Reference {
        /// Referenced model name (e.g., "Parent")
        model: String,
    },
    /// One of a fixed set of values
    Enum {
        /// Allowed values
        variants: Vec<String>,
    },
}

/// HTML input hint for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Text input
    Text,
    /// Textarea
    Textarea,
    /// Number input
    Number,
    /// Checkbox
    Checkbox,
    /// Date input
    Date,
    /// Date and time input
    DateTimeLocal,
    /// Select dropdown
    Select,
    /// Hidden input
    Hidden,
}

impl InputType {
    /// Get the HTML type attribute value (or element name for textarea/select)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::DateTimeLocal => "datetime-local",
            Self::Select => "select",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FieldDefinition {
    /// Create a plain field with no modifiers
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            primary_key: false,
            optional: false,
            unique: false,
            indexed: false,
            validators: Vec::new(),
        }
    }

    /// Parse a field definition from a string
    ///
    /// Format: `name:type[:modifier]*`
    ///
    /// # Examples
    ///
    /// ```
    /// use acton_crud::schema::{FieldDefinition, FieldType};
    ///
    /// let field = FieldDefinition::parse("id:integer:pk").unwrap();
    /// assert!(field.primary_key);
    ///
    /// let field = FieldDefinition::parse("parent_id:references:Parent").unwrap();
    /// assert!(field.is_foreign_key());
    /// assert_eq!(field.field_type, FieldType::Reference { model: "Parent".into() });
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::Schema`] if:
    /// - Field definition has fewer than 2 parts (missing name or type)
    /// - Field name is empty or not a valid identifier
    /// - Field type is unknown or malformed
    /// - Unknown modifier is specified
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(':').collect();

        if parts.len() < 2 {
            return Err(CrudError::Schema(format!(
                "Invalid field definition: '{input}'. Expected format: name:type[:modifiers]"
            )));
        }

        let name = parts[0].trim().to_string();
        if name.is_empty() {
            return Err(CrudError::Schema("Field name cannot be empty".to_string()));
        }

        if !name.chars().next().unwrap_or('0').is_alphabetic()
            || !name.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(CrudError::Schema(format!(
                "Invalid field name: '{name}'. Must be alphanumeric + underscore"
            )));
        }

        // References and enums carry colons/commas, so the type runs until
        // the first recognised modifier.
        let modifier_keywords = [
            "pk",
            "primary_key",
            "optional",
            "required",
            "unique",
            "indexed",
            "index",
        ];
        let mut type_end_idx = parts.len();
        for (idx, part) in parts.iter().enumerate().skip(2) {
            if modifier_keywords.contains(&part.trim().to_lowercase().as_str()) {
                type_end_idx = idx;
                break;
            }
        }

        let type_str = parts[1..type_end_idx].join(":");
        let mut field = Self::new(name, Self::parse_type(&type_str)?);

        for modifier in parts.iter().skip(type_end_idx) {
            match modifier.trim().to_lowercase().as_str() {
                "pk" | "primary_key" => field.primary_key = true,
                "optional" => field.optional = true,
                "required" => field.validators.push(FieldValidator::Required),
                "unique" => field.unique = true,
                "indexed" | "index" => field.indexed = true,
                unknown => {
                    return Err(CrudError::Schema(format!(
                        "Unknown modifier: '{unknown}'. Valid modifiers: pk, optional, required, unique, indexed"
                    )));
                }
            }
        }

        Ok(field)
    }

    fn parse_type(type_str: &str) -> Result<FieldType> {
        if let Some(variants_str) = type_str.strip_prefix("enum:") {
            let variants: Vec<String> = variants_str
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();

            if variants.is_empty() {
                return Err(CrudError::Schema(
                    "Enum type must have at least one variant. Format: enum:Variant1,Variant2"
                        .to_string(),
                ));
            }

            return Ok(FieldType::Enum { variants });
        }

        if let Some(model) = type_str
            .strip_prefix("references:")
            .or_else(|| type_str.strip_prefix("belongs_to:"))
        {
            let model = model.trim();
            if model.is_empty() {
                return Err(CrudError::Schema(
                    "Reference type must name a model. Format: references:Model".to_string(),
                ));
            }
            return Ok(FieldType::Reference {
                model: model.to_string(),
            });
        }

        match type_str.trim().to_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "text" => Ok(FieldType::Text),
            "integer" | "int" | "i32" => Ok(FieldType::Integer),
            "bigint" | "biginteger" | "i64" => Ok(FieldType::BigInt),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "float" | "f32" => Ok(FieldType::Float),
            "double" | "f64" => Ok(FieldType::Double),
            "date" => Ok(FieldType::Date),
            "datetime" => Ok(FieldType::DateTime),
            "uuid" => Ok(FieldType::Uuid),
            "json" | "jsonb" => Ok(FieldType::Json),
            unknown => Err(CrudError::Schema(format!(
                "Unknown field type: '{unknown}'. Supported types: string, text, integer, bigint, boolean, float, double, date, datetime, uuid, json, references:Model, enum:Variant1,Variant2"
            ))),
        }
    }

    /// Whether this field holds a foreign key to another entity
    #[must_use]
    pub const fn is_foreign_key(&self) -> bool {
        matches!(self.field_type, FieldType::Reference { .. })
    }

    /// Add a validator
    #[must_use]
    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }
}

impl FieldType {
    /// Whether an empty submission is a legitimate value rather than "unset"
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Text)
    }

    /// Coerce a posted string into a typed value
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] describing the conversion failure. The code is
    /// stable (`invalid_integer`, `invalid_choice`, ...) for programmatic use.
    pub fn coerce(&self, raw: &str) -> std::result::Result<Value, FieldError> {
        match self {
            Self::String | Self::Text => Ok(Value::String(raw.to_string())),
            Self::Integer => raw
                .trim()
                .parse::<i32>()
                .map(|n| Value::Integer(i64::from(n)))
                .map_err(|_| FieldError::with_code("Not a valid integer value.", "invalid_integer")),
            Self::BigInt | Self::Reference { .. } => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| FieldError::with_code("Not a valid integer value.", "invalid_integer")),
            Self::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "on" | "yes" | "y" => Ok(Value::Boolean(true)),
                "false" | "0" | "off" | "no" | "n" => Ok(Value::Boolean(false)),
                _ => Err(FieldError::with_code("Not a valid boolean value.", "invalid_boolean")),
            },
            Self::Float | Self::Double => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Float)
                .ok_or_else(|| FieldError::with_code("Not a valid float value.", "invalid_float")),
            Self::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| FieldError::with_code("Not a valid date value.", "invalid_date")),
            Self::DateTime => DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
                .map(Value::DateTime)
                .ok_or_else(|| {
                    FieldError::with_code("Not a valid datetime value.", "invalid_datetime")
                }),
            Self::Uuid => Uuid::parse_str(raw.trim())
                .map(Value::Uuid)
                .map_err(|_| FieldError::with_code("Not a valid UUID.", "invalid_uuid")),
            Self::Json => serde_json::from_str(raw)
                .map(Value::Json)
                .map_err(|_| FieldError::with_code("Not valid JSON.", "invalid_json")),
            Self::Enum { variants } => {
                if variants.iter().any(|v| v == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(FieldError::with_code("Not a valid choice.", "invalid_choice"))
                }
            }
        }
    }

    /// HTML input hint for this field type
    #[must_use]
    pub const fn input_type(&self) -> InputType {
        match self {
            Self::String | Self::Uuid => InputType::Text,
            Self::Text | Self::Json => InputType::Textarea,
            Self::Integer | Self::BigInt | Self::Float | Self::Double => InputType::Number,
            Self::Boolean => InputType::Checkbox,
            Self::Date => InputType::Date,
            Self::DateTime => InputType::DateTimeLocal,
            Self::Enum { .. } => InputType::Select,
            Self::Reference { .. } => InputType::Hidden,
        }
    }
}

impl fmt::Display for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        let field_type = &self.field_type;
        write!(f, "{name}:{field_type}")?;
        if self.primary_key {
            write!(f, ":pk")?;
        }
        if self.optional {
            write!(f, ":optional")?;
        }
        if self.unique {
            write!(f, ":unique")?;
        }
        if self.indexed {
            write!(f, ":indexed")?;
        }
        Ok(())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::BigInt => write!(f, "bigint"),
            Self::Boolean => write!(f, "boolean"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "datetime"),
            Self::Uuid => write!(f, "uuid"),
            Self::Json => write!(f, "json"),
            Self::Reference { model } => write!(f, "references:{model}"),
            Self::Enum { variants } => write!(f, "enum:{}", variants.join(",")),
        }
    }
}

//! Field-level validators
//!
//! Thin wrappers over the `validator` crate's checks so they can be attached
//! to a dynamically declared field instead of a derived struct.

use validator::{ValidateEmail, ValidateLength, ValidateRange, ValidateUrl};

use crate::forms::FieldError;
use crate::record::Value;

/// A check run against a bound field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValidator {
    /// Value must be present and non-blank
    Required,
    /// Text length bounds
    Length {
        /// Minimum length
        min: Option<u64>,
        /// Maximum length
        max: Option<u64>,
    },
    /// Numeric bounds (inclusive)
    Range {
        /// Minimum value
        min: Option<f64>,
        /// Maximum value
        max: Option<f64>,
    },
    /// Text must be an email address
    Email,
    /// Text must be a URL
    Url,
}

impl FieldValidator {
    /// Whether a failure of this validator stops the remaining chain
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Run the check
    ///
    /// Checks other than [`Self::Required`] pass on an unset value; presence
    /// is the job of `Required`.
    ///
    /// # Errors
    ///
    /// Returns the [`FieldError`] to report against the field.
    pub fn check(&self, value: Option<&Value>) -> Result<(), FieldError> {
        match (self, value) {
            (Self::Required, None) => Err(required()),
            (Self::Required, Some(Value::String(s))) if s.trim().is_empty() => Err(required()),
            (Self::Required, Some(_)) | (_, None) => Ok(()),
            (Self::Length { min, max }, Some(Value::String(s))) => {
                if s.validate_length(*min, *max, None) {
                    Ok(())
                } else {
                    Err(FieldError::with_code(length_message(*min, *max), "length"))
                }
            }
            (Self::Range { min, max }, Some(value)) => match value.as_f64() {
                Some(n) if n.validate_range(*min, *max, None, None) => Ok(()),
                Some(_) => Err(FieldError::with_code(range_message(*min, *max), "range")),
                None => Ok(()),
            },
            (Self::Email, Some(Value::String(s))) => {
                if s.validate_email() {
                    Ok(())
                } else {
                    Err(FieldError::with_code("Invalid email address.", "email"))
                }
            }
            (Self::Url, Some(Value::String(s))) => {
                if s.validate_url() {
                    Ok(())
                } else {
                    Err(FieldError::with_code("Invalid URL.", "url"))
                }
            }
            (Self::Length { .. } | Self::Email | Self::Url, Some(_)) => Ok(()),
        }
    }
}

fn required() -> FieldError {
    FieldError::with_code("This field is required.", "required")
}

fn length_message(min: Option<u64>, max: Option<u64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("Field must be between {min} and {max} characters long."),
        (Some(min), None) => format!("Field must be at least {min} characters long."),
        (None, Some(max)) => format!("Field cannot be longer than {max} characters."),
        (None, None) => "Invalid length.".to_string(),
    }
}

fn range_message(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("Number must be between {min} and {max}."),
        (Some(min), None) => format!("Number must be at least {min}."),
        (None, Some(max)) => format!("Number must be at most {max}."),
        (None, None) => "Number is out of range.".to_string(),
    }
}

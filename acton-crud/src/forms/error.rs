//! Form validation error types
//!
//! Field-level failures never abort form construction. They are collected
//! per field key; inline rows report under their prefixed keys
//! (`child_0_text`) so a single collection describes the whole form tree.

use std::collections::BTreeMap;

/// A single validation error for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The error message
    pub message: String,
    /// Optional error code for programmatic handling
    pub code: Option<String>,
}

impl FieldError {
    /// Create a new field error with just a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Create a field error with a message and code
    #[must_use]
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Collection of validation errors keyed by field key
///
/// # Examples
///
/// ```rust
/// use acton_crud::forms::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("name", "is required");
/// errors.add("child_0_text", "too long");
///
/// assert!(errors.has_errors());
/// assert_eq!(errors.fields_with_errors(), vec!["child_0_text", "name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    /// Create a new empty error collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(field, FieldError::new(message));
    }

    /// Add an error with a code for a field
    pub fn add_with_code(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) {
        self.push(field, FieldError::with_code(message, code));
    }

    /// Add an already built error for a field
    pub fn push(&mut self, field: impl Into<String>, error: FieldError) {
        self.errors.entry(field.into()).or_default().push(error);
    }

    /// Check if there are any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if a specific field has errors
    #[must_use]
    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get all errors for a specific field
    #[must_use]
    pub fn for_field(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Get all field keys that have errors, in key order
    #[must_use]
    pub fn fields_with_errors(&self) -> Vec<&str> {
        self.errors.keys().map(String::as_str).collect()
    }

    /// Get the total number of errors
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Clear all errors
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Merge errors from another collection
    pub fn merge(&mut self, other: &Self) {
        for (field, errors) in &other.errors {
            self.errors
                .entry(field.clone())
                .or_default()
                .extend(errors.iter().cloned());
        }
    }

    /// Iterate over all errors
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.errors
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Convert from validator crate's `ValidationErrors`
///
/// Useful when a handler validates a derived struct alongside a model form
/// and wants to report both through one collection.
impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut result = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                result.add_with_code(field.to_string(), message, error.code.to_string());
            }
        }
        result
    }
}

//! Posted form data and the inline key convention
//!
//! Inline rows are flattened into the same submission as their parent:
//!
//! ```text
//! name=Acme
//! child_count=2
//! child_0_text=a
//! child_1_text=b
//! ```
//!
//! `child` is the inline's form-set name, `count` announces how many rows were
//! rendered, and each row's fields are prefixed with `<name>_<row>`. Nested
//! inlines repeat the pattern under the row prefix (`child_0_toy_count`).

use crate::config::FormSettings;

/// One HTTP submission: ordered, multi-valued string pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedData {
    pairs: Vec<(String, String)>,
}

impl PostedData {
    /// Create an empty submission
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs, keeping their order
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Append a value
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value submitted under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `key`, in order
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether `key` was submitted at all
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Number of submitted pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether nothing was submitted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over all pairs in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for PostedData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How prefixed keys are spelled, and how many rows a count key may announce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFormat {
    separator: String,
    count_suffix: String,
    max_rows: usize,
}

impl Default for KeyFormat {
    fn default() -> Self {
        Self::from(&FormSettings::default())
    }
}

impl From<&FormSettings> for KeyFormat {
    fn from(settings: &FormSettings) -> Self {
        Self {
            separator: settings.key_separator.clone(),
            count_suffix: settings.count_suffix.clone(),
            max_rows: settings.max_inline_rows,
        }
    }
}

impl KeyFormat {
    /// Join `name` under an optional prefix
    #[must_use]
    pub fn join(&self, prefix: Option<&str>, name: &str) -> String {
        match prefix {
            Some(prefix) => format!("{prefix}{}{name}", self.separator),
            None => name.to_string(),
        }
    }

    /// Key announcing the row count of the inline at `prefix`
    #[must_use]
    pub fn count_key(&self, prefix: &str) -> String {
        self.join(Some(prefix), &self.count_suffix)
    }

    /// Largest row count accepted for one inline
    #[must_use]
    pub const fn max_rows(&self) -> usize {
        self.max_rows
    }
}

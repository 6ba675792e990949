//! Configuration management for acton-crud
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/acton-crud/{service}/config.toml` (user config, XDG)
//! 4. `/etc/acton-crud/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [forms]
//! inline_extra = 1
//! key_separator = "_"
//! count_suffix = "count"
//! plural_suffix = "s"
//! max_inline_rows = 100
//!
//! [observability]
//! service_name = "my-admin"
//! filter = "info,acton_crud=debug"
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use acton_crud::config::CrudConfig;
//! use acton_crud::forms::FormSpec;
//! use acton_crud::schema::EntitySchema;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = CrudConfig::load_for_service("my-admin")?;
//!
//! let schema = EntitySchema::builder("Parent").field("id:integer:pk").build()?;
//! let spec = FormSpec::builder(schema).settings(&config.forms).build()?;
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::observability::ObservabilityConfig;

/// Form generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Blank rows offered per inline when the inline does not set its own
    pub inline_extra: usize,

    /// Separator between key prefix segments (`child_0_text`)
    pub key_separator: String,

    /// Last segment of an inline's row-count key (`child_count`)
    pub count_suffix: String,

    /// Appended to a title to form the default plural title
    pub plural_suffix: String,

    /// Largest row count accepted for one inline in a submission
    pub max_inline_rows: usize,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            inline_extra: 0,
            key_separator: "_".to_string(),
            count_suffix: "count".to_string(),
            plural_suffix: "s".to_string(),
            max_inline_rows: 100,
        }
    }
}

/// Complete acton-crud configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrudConfig {
    /// Form generation settings
    #[serde(default)]
    pub forms: FormSettings,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl CrudConfig {
    /// Load configuration for a specific service
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be read or parsed
    /// - Configuration values fail type conversion
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_crud::config::CrudConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = CrudConfig::load_for_service("my-admin")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment =
            Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc/acton-crud")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed("ACTON_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file yields the defaults (plus environment overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_crud::config::CrudConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = CrudConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ACTON_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_crud::config::CrudConfig;
    ///
    /// let path = CrudConfig::recommended_path("my-admin");
    /// // Returns: ~/.config/acton-crud/my-admin/config.toml
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("acton-crud")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    fn clear_env() {
        env::remove_var("ACTON_FORMS__INLINE_EXTRA");
        env::remove_var("ACTON_FORMS__KEY_SEPARATOR");
    }

    #[test]
    fn test_default_config() {
        let config = CrudConfig::default();
        assert_eq!(config.forms.inline_extra, 0);
        assert_eq!(config.forms.key_separator, "_");
        assert_eq!(config.forms.count_suffix, "count");
        assert_eq!(config.forms.plural_suffix, "s");
        assert_eq!(config.forms.max_inline_rows, 100);
        assert_eq!(config.observability.service_name, "acton-crud");
    }

    #[test]
    fn test_recommended_path() {
        let path = CrudConfig::recommended_path("test-app");
        let path = path.to_str().unwrap();

        assert!(path.contains("test-app"));
        assert!(path.ends_with("config.toml"));
        assert!(path.contains("acton-crud"));
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        clear_env();

        let config = CrudConfig::load_from("/nonexistent/path/config.toml").unwrap();
        assert_eq!(config.forms, FormSettings::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        clear_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[forms]
inline_extra = 2
count_suffix = "total"

[observability]
service_name = "admin"
"#,
        )
        .unwrap();

        let config = CrudConfig::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.forms.inline_extra, 2);
        assert_eq!(config.forms.count_suffix, "total");
        assert_eq!(config.forms.key_separator, "_");
        assert_eq!(config.observability.service_name, "admin");
    }

    #[test]
    fn test_load_for_service_with_defaults() {
        clear_env();

        let config = CrudConfig::load_for_service("nonexistent-service-123").unwrap();
        assert_eq!(config.forms.plural_suffix, "s");
    }
}

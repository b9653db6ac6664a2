//! # idt-config
//!
//! Layered configuration loading for idt using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Command-line flags (merged by `idt-cli` on top of [`IdtConfig::figment`])
//! 2. Environment variables (`IDT_*` prefix, `__` as separator)
//! 3. Project-level `.idt/config.toml`
//! 4. User-level `~/.config/idt/config.toml`
//! 5. Built-in defaults
//!
//! List values are unioned across layers rather than replaced, so ignored
//! names collected from a user config, a project config and the command line
//! all apply together.
//!
//! # Environment Variable Mapping
//!
//! Figment maps `IDT_ANNOTATE__EXPORT_MACRO` -> `annotate.export_macro`,
//! `IDT_FIXITS__INPLACE` -> `fixits.inplace`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use idt_config::IdtConfig;
//!
//! let config = IdtConfig::load_with_dotenv().expect("config");
//! println!("export macro: {}", config.annotate.export_macro);
//! ```

mod annotate;
mod error;
mod fixits;
mod ignore;
mod paths;

pub use annotate::AnnotateConfig;
pub use error::ConfigError;
pub use fixits::FixitsConfig;
pub use ignore::IgnoreConfig;
pub use paths::{DEFAULT_INTERNAL_PATHS, PathsConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config location, relative to the working directory.
pub const PROJECT_CONFIG: &str = ".idt/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdtConfig {
    #[serde(default)]
    pub annotate: AnnotateConfig,
    #[serde(default)]
    pub fixits: FixitsConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

impl IdtConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    /// Returns `ConfigError` if a source is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Load configuration after reading `.env` from the working directory.
    ///
    /// # Errors
    /// Returns `ConfigError` if a source is malformed or validation fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate a configuration from an arbitrary provider chain.
    ///
    /// # Errors
    /// Returns `ConfigError` if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the default provider chain rooted at the working directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_in(Path::new("."))
    }

    /// Build the default provider chain for the project at `project_root`.
    #[must_use]
    pub fn figment_in(project_root: &Path) -> Figment {
        Self::figment_with(Self::global_config_path(), project_root)
    }

    /// Build the provider chain from an explicit user-global config and
    /// project root. Public so tests and embedders can avoid the real home
    /// directory.
    #[must_use]
    pub fn figment_with(global_path: Option<PathBuf>, project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                figment = figment.admerge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(PROJECT_CONFIG);
        if local_path.exists() {
            figment = figment.admerge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.admerge(Env::prefixed("IDT_").split("__"))
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    /// Returns `ConfigError::Missing` without an export macro and
    /// `ConfigError::InvalidValue` when a macro is not a single token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let export_macro = self.annotate.export_macro.trim();
        if export_macro.is_empty() {
            return Err(ConfigError::Missing {
                field: "annotate.export_macro".to_string(),
                hint: "pass --export-macro or set it in .idt/config.toml".to_string(),
            });
        }

        let macros = std::iter::once(&self.annotate.export_macro)
            .chain(&self.annotate.known_export_macros)
            .chain(&self.annotate.transparent_macros);
        for name in macros {
            if !is_identifier(name) {
                return Err(ConfigError::InvalidValue {
                    field: "annotate".to_string(),
                    reason: format!("'{name}' is not a macro identifier"),
                });
            }
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("idt").join("config.toml"))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_not_runnable() {
        let config = IdtConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing { .. })
        ));
        assert!(config.annotate.annotate_classes);
        assert!(!config.fixits.apply);
        assert!(!config.fixits.inplace);
    }

    #[test]
    fn export_macro_must_be_a_token() {
        let mut config = IdtConfig::default();
        config.annotate.export_macro = "__declspec(dllexport)".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.annotate.export_macro = "LIB_ABI".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn transparent_macros_are_validated() {
        let mut config = IdtConfig::default();
        config.annotate.export_macro = "LIB_ABI".to_string();
        config.annotate.transparent_macros = vec!["1BAD".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("_X1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("A B"));
        assert!(!is_identifier("9A"));
    }
}

//! Names that are never flagged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IgnoreConfig {
    /// Function names to ignore. Entries may be comma-separated lists.
    #[serde(default)]
    pub names: Vec<String>,

    /// Drop the built-in list of compiler builtins.
    #[serde(default)]
    pub no_defaults: bool,
}

impl IgnoreConfig {
    /// Split comma-separated entries into individual names.
    #[must_use]
    pub fn split_names(&self) -> Vec<String> {
        self.names
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }
}

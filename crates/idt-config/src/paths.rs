//! File-system related settings: include search and internal-path heuristics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Globs for library-implementation files that are never public interface.
pub const DEFAULT_INTERNAL_PATHS: &[&str] = &["**/lib/**", "**/tools/**", "**/*.def"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Glob patterns matched against a declaration's owning file. Unset means
    /// [`DEFAULT_INTERNAL_PATHS`]; an empty list disables the heuristic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<Vec<String>>,

    /// Record names that must never be annotated.
    #[serde(default)]
    pub reserved_records: Vec<String>,

    /// User include search directories (`-I`).
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// System include search directories (`-isystem`). Headers found here
    /// are treated as system headers.
    #[serde(default)]
    pub system_include_dirs: Vec<PathBuf>,
}

impl PathsConfig {
    #[must_use]
    pub fn internal_patterns(&self) -> Vec<String> {
        self.internal.clone().unwrap_or_else(|| {
            DEFAULT_INTERNAL_PATHS
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_lib_tools_and_def_files() {
        let config = PathsConfig::default();
        assert_eq!(
            config.internal_patterns(),
            vec!["**/lib/**", "**/tools/**", "**/*.def"]
        );
        assert!(config.include_dirs.is_empty());
        assert!(config.system_include_dirs.is_empty());
    }

    #[test]
    fn explicit_empty_list_disables_heuristic() {
        let config = PathsConfig {
            internal: Some(Vec::new()),
            ..PathsConfig::default()
        };
        assert!(config.internal_patterns().is_empty());
    }
}

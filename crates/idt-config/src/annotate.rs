//! Annotation configuration: which macro marks an exported declaration.

use serde::{Deserialize, Serialize};

/// Default for record-level annotation.
const fn default_annotate_classes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnotateConfig {
    /// Macro inserted to mark a declaration exported (e.g. `MYLIB_ABI`). Required.
    #[serde(default)]
    pub export_macro: String,

    /// Annotate whole records instead of their members.
    #[serde(default = "default_annotate_classes")]
    pub annotate_classes: bool,

    /// Report unexported interfaces without attaching fix-its.
    #[serde(default)]
    pub report_only: bool,

    /// Other macros that already mean "exported" in this codebase.
    #[serde(default)]
    pub known_export_macros: Vec<String>,

    /// Attribute-like macros that expand to nothing relevant (e.g. `MYLIB_DEPRECATED`).
    #[serde(default)]
    pub transparent_macros: Vec<String>,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            export_macro: String::new(),
            annotate_classes: default_annotate_classes(),
            report_only: false,
            known_export_macros: Vec::new(),
            transparent_macros: Vec::new(),
        }
    }
}

impl AnnotateConfig {
    /// Every macro that marks a declaration as exported, the configured one first.
    #[must_use]
    pub fn export_macros(&self) -> Vec<&str> {
        let mut macros = Vec::with_capacity(1 + self.known_export_macros.len());
        if !self.export_macro.is_empty() {
            macros.push(self.export_macro.as_str());
        }
        for name in &self.known_export_macros {
            if !macros.contains(&name.as_str()) {
                macros.push(name.as_str());
            }
        }
        macros
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = AnnotateConfig::default();
        assert!(config.export_macro.is_empty());
        assert!(config.annotate_classes);
        assert!(!config.report_only);
        assert!(config.export_macros().is_empty());
    }

    #[test]
    fn export_macros_deduplicates() {
        let config = AnnotateConfig {
            export_macro: "LIB_ABI".to_string(),
            known_export_macros: vec!["LIB_ABI".to_string(), "OLD_API".to_string()],
            ..AnnotateConfig::default()
        };
        assert_eq!(config.export_macros(), vec!["LIB_ABI", "OLD_API"]);
    }
}

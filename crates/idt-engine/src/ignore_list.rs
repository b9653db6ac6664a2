//! Names that are never flagged.

use std::collections::HashSet;

/// Compiler builtins that are forward-declared in headers but synthesized by
/// the compiler, so they can never carry an annotation.
pub const DEFAULT_IGNORED: &[&str] = &[
    "_BitScanForward",
    "_BitScanForward64",
    "_BitScanReverse",
    "_BitScanReverse64",
    "__builtin_strlen",
];

/// Read-only set of ignored identifiers, built once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    names: HashSet<String>,
}

impl IgnoreList {
    /// Merge `defaults` with user entries. Each user entry may itself be a
    /// comma-separated list; blanks are dropped and duplicates collapse.
    pub fn build<D, U, S>(defaults: D, user_entries: U) -> Self
    where
        D: IntoIterator<Item = S>,
        U: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = HashSet::new();
        for name in defaults {
            insert_entry(&mut names, name.as_ref());
        }
        for entry in user_entries {
            insert_entry(&mut names, entry.as_ref());
        }
        Self { names }
    }

    /// The built-in list merged with user entries.
    pub fn with_defaults<U, S>(user_entries: U) -> Self
    where
        U: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let user: Vec<String> = user_entries
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        Self::build(DEFAULT_IGNORED.iter().map(|s| (*s).to_string()), user)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn insert_entry(names: &mut HashSet<String>, entry: &str) {
    for name in entry.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        names.insert(name.to_string());
    }
}

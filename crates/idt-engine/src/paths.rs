//! Internal-path predicate: files that are library implementation, not interface.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::EngineError;

/// Decides whether a file belongs to a library's implementation rather than
/// its public interface. Declarations owned by such files are never flagged.
pub trait PathPredicate: Send + Sync {
    fn is_internal(&self, path: &Path) -> bool;
}

impl<F> PathPredicate for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_internal(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Glob-based predicate built from configured patterns.
///
/// With a project root set, paths under it are matched relative to it, so a
/// checkout that itself lives below a `lib/` directory is not swallowed by
/// `**/lib/**`.
#[derive(Debug, Clone)]
pub struct InternalPaths {
    patterns: Vec<String>,
    set: GlobSet,
    root: Option<PathBuf>,
}

impl InternalPaths {
    /// Compile `patterns` into one matcher.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidPattern` for the first malformed glob.
    pub fn new<I, S>(patterns: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| EngineError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        let set = builder.build().map_err(|source| EngineError::InvalidPattern {
            pattern: kept.join(", "),
            source,
        })?;
        Ok(Self {
            patterns: kept,
            set,
            root: None,
        })
    }

    /// A predicate that matches nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
            root: None,
        }
    }

    /// Match paths below `root` relative to it.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        self.root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }
}

impl PathPredicate for InternalPaths {
    fn is_internal(&self, path: &Path) -> bool {
        self.set.is_match(self.relative(path))
    }
}

//! Translation units: a main file plus the headers it pulls in.
//!
//! There is no preprocessor. `#include` directives are resolved against the
//! including file's directory and the configured search paths, and each
//! resolved file is masked and parsed on its own. Files found through a
//! system search path, or included from one, are system headers.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ParserError;
use crate::lines::LineIndex;
use crate::mask::{MacroSet, MaskedSource};
use crate::parser::{is_cpp_path, is_header_path};

/// One file of a translation unit, ready for parsing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub masked: MaskedSource,
    pub lines: LineIndex,
    pub is_system: bool,
    /// Reached through `#include`, or a header named directly.
    pub from_included_file: bool,
}

impl SourceFile {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        macros: &MacroSet,
        is_system: bool,
        from_included_file: bool,
    ) -> Self {
        let source = source.into();
        let masked = MaskedSource::mask(&source, macros);
        let lines = LineIndex::new(&source);
        Self {
            path: path.into(),
            source,
            masked,
            lines,
            is_system,
            from_included_file,
        }
    }
}

/// The files classified together for one command-line input.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    main: PathBuf,
    files: Vec<SourceFile>,
}

impl TranslationUnit {
    #[must_use]
    pub fn main(&self) -> &Path {
        &self.main
    }

    /// Main file first, then included files in discovery order.
    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Search paths used to resolve `#include`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    pub include_dirs: Vec<PathBuf>,
    pub system_include_dirs: Vec<PathBuf>,
    pub follow_includes: bool,
}

/// An `#include` directive found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub target: String,
    pub angled: bool,
    pub line: usize,
}

/// Reads translation units from disk.
#[derive(Debug, Clone)]
pub struct UnitLoader {
    options: LoaderOptions,
    macros: MacroSet,
}

impl UnitLoader {
    #[must_use]
    pub const fn new(options: LoaderOptions, macros: MacroSet) -> Self {
        Self { options, macros }
    }

    #[must_use]
    pub const fn macros(&self) -> &MacroSet {
        &self.macros
    }

    /// Load `path` and, when enabled, every header it transitively includes.
    ///
    /// # Errors
    /// Returns `ParserError::UnsupportedFile` for a non C/C++ path and
    /// `ParserError::Io` when the main file cannot be read. Unreadable or
    /// unresolved includes are logged and skipped.
    pub fn load(&self, path: &Path) -> Result<TranslationUnit, ParserError> {
        if !is_cpp_path(path) {
            return Err(ParserError::UnsupportedFile(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|source| ParserError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let main = SourceFile::new(
            normalize(path),
            source,
            &self.macros,
            false,
            is_header_path(path),
        );

        let mut visited = HashSet::from([canonical(path)]);
        let mut files = vec![main];
        let mut queue = VecDeque::from([0usize]);

        while let Some(idx) = queue.pop_front() {
            if !self.options.follow_includes {
                break;
            }
            let includer = files[idx].path.clone();
            let includer_system = files[idx].is_system;
            for directive in include_directives(&files[idx].source) {
                let Some((resolved, in_system_dir)) = self.resolve(&includer, &directive) else {
                    if directive.angled {
                        debug!(
                            file = %includer.display(),
                            target = %directive.target,
                            "unresolved system include"
                        );
                    } else {
                        warn!(
                            file = %includer.display(),
                            line = directive.line,
                            target = %directive.target,
                            "unresolved include"
                        );
                    }
                    continue;
                };
                if !visited.insert(canonical(&resolved)) {
                    continue;
                }
                match fs::read_to_string(&resolved) {
                    Ok(source) => {
                        files.push(SourceFile::new(
                            normalize(&resolved),
                            source,
                            &self.macros,
                            includer_system || in_system_dir,
                            true,
                        ));
                        queue.push_back(files.len() - 1);
                    }
                    Err(err) => {
                        warn!(file = %resolved.display(), error = %err, "unreadable include");
                    }
                }
            }
        }

        Ok(TranslationUnit {
            main: path.to_path_buf(),
            files,
        })
    }

    /// A single-file unit from in-memory text. Includes are not followed.
    #[must_use]
    pub fn from_source(&self, path: impl Into<PathBuf>, source: impl Into<String>) -> TranslationUnit {
        let path = path.into();
        let from_included = is_header_path(&path);
        let file = SourceFile::new(path.clone(), source, &self.macros, false, from_included);
        TranslationUnit {
            main: path,
            files: vec![file],
        }
    }

    /// Quoted includes look next to the includer first. Returns the path and
    /// whether it was found through a system directory.
    fn resolve(&self, includer: &Path, directive: &IncludeDirective) -> Option<(PathBuf, bool)> {
        let local = (!directive.angled)
            .then(|| includer.parent().map(|dir| dir.join(&directive.target)))
            .flatten()
            .filter(|candidate| candidate.is_file())
            .map(|candidate| (candidate, false));

        local
            .or_else(|| {
                self.options
                    .include_dirs
                    .iter()
                    .map(|dir| dir.join(&directive.target))
                    .find(|candidate| candidate.is_file())
                    .map(|candidate| (candidate, false))
            })
            .or_else(|| {
                self.options
                    .system_include_dirs
                    .iter()
                    .map(|dir| dir.join(&directive.target))
                    .find(|candidate| candidate.is_file())
                    .map(|candidate| (candidate, true))
            })
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Collapse `.` and `..` components without touching the file system, so a
/// header reached as `src/../inc/api.h` and as `inc/api.h` gets one name.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// `#include "x"` and `#include <x>` directives, in file order.
#[must_use]
pub fn include_directives(source: &str) -> Vec<IncludeDirective> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let rest = line.trim_start().strip_prefix('#')?.trim_start();
            let rest = rest.strip_prefix("include")?.trim_start();
            let (close, angled) = match rest.chars().next()? {
                '"' => ('"', false),
                '<' => ('>', true),
                _ => return None,
            };
            let body = &rest[1..];
            let end = body.find(close)?;
            Some(IncludeDirective {
                target: body[..end].to_string(),
                angled,
                line: idx + 1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn directives_are_found_in_order() {
        let source = "#include \"a.h\"\n  #  include <b/c.h>\n// #include \"no.h\"\n#include MACRO\n#pragma once\n";
        let found = include_directives(source);
        assert_eq!(
            found,
            vec![
                IncludeDirective {
                    target: "a.h".to_string(),
                    angled: false,
                    line: 1,
                },
                IncludeDirective {
                    target: "b/c.h".to_string(),
                    angled: true,
                    line: 2,
                },
            ]
        );
    }

    #[test]
    fn normalize_collapses_dot_components() {
        assert_eq!(normalize(Path::new("src/../inc/api.h")), PathBuf::from("inc/api.h"));
        assert_eq!(normalize(Path::new("./inc/./api.h")), PathBuf::from("inc/api.h"));
        assert_eq!(normalize(Path::new("../inc/api.h")), PathBuf::from("../inc/api.h"));
        assert_eq!(normalize(Path::new("/../usr/include/a.h")), PathBuf::from("/usr/include/a.h"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn from_source_marks_headers_as_included() {
        let loader = UnitLoader::new(LoaderOptions::default(), MacroSet::default());
        let unit = loader.from_source("api.hh", "void f();");
        assert!(unit.files()[0].from_included_file);
        let unit = loader.from_source("main.cc", "void f();");
        assert!(!unit.files()[0].from_included_file);
    }

    #[test]
    fn rejects_non_cpp_files() {
        let loader = UnitLoader::new(LoaderOptions::default(), MacroSet::default());
        let err = loader.load(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ParserError::UnsupportedFile(_)));
    }

    #[test]
    fn missing_main_file_is_io_error() {
        let loader = UnitLoader::new(LoaderOptions::default(), MacroSet::default());
        let err = loader.load(Path::new("/nonexistent/idt/missing.h")).unwrap_err();
        assert!(matches!(err, ParserError::Io { .. }));
    }
}

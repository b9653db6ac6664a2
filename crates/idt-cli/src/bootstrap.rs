//! Configuration loading and the read-only state shared by every
//! translation unit of a run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::Serialized;
use idt_config::IdtConfig;
use idt_engine::{IgnoreList, InternalPaths, Policy};
use idt_parser::{LoaderOptions, MacroSet, UnitLoader};
use tracing::{debug, warn};

use crate::cli::CheckArgs;

/// Load configuration with command-line flags layered on top.
pub fn load_config(args: &CheckArgs) -> anyhow::Result<IdtConfig> {
    let _ = dotenvy::dotenv();
    let figment = apply_overrides(IdtConfig::figment_in(&project_root(args)), args);
    IdtConfig::from_figment(figment).context("invalid configuration")
}

/// The project directory: `--project`, or the working directory.
pub fn project_root(args: &CheckArgs) -> PathBuf {
    args.project.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Flags only override what they set. List flags are unioned with the
/// configured lists.
pub fn apply_overrides(mut figment: Figment, args: &CheckArgs) -> Figment {
    if let Some(export_macro) = &args.export_macro {
        figment = figment.admerge(Serialized::default("annotate.export_macro", export_macro));
    }
    if let Some(annotate_classes) = args.annotate_classes {
        figment = figment.admerge(Serialized::default(
            "annotate.annotate_classes",
            annotate_classes,
        ));
    }
    if args.report_only {
        figment = figment.admerge(Serialized::default("annotate.report_only", true));
    }
    if args.apply_fixits {
        figment = figment.admerge(Serialized::default("fixits.apply", true));
    }
    if args.inplace {
        figment = figment.admerge(Serialized::default("fixits.inplace", true));
    }
    if !args.ignore.is_empty() {
        figment = figment.admerge(Serialized::default("ignore.names", &args.ignore));
    }
    if args.no_default_ignores {
        figment = figment.admerge(Serialized::default("ignore.no_defaults", true));
    }
    if !args.include_dirs.is_empty() {
        figment = figment.admerge(Serialized::default("paths.include_dirs", &args.include_dirs));
    }
    if !args.system_include_dirs.is_empty() {
        figment = figment.admerge(Serialized::default(
            "paths.system_include_dirs",
            &args.system_include_dirs,
        ));
    }
    if !args.internal_paths.is_empty() {
        figment = figment.admerge(Serialized::default("paths.internal", &args.internal_paths));
    }
    figment
}

/// Everything the pipeline reads, built once per run.
pub struct RunContext {
    pub policy: Policy,
    pub ignore: IgnoreList,
    pub loader: UnitLoader,
    pub apply_fixits: bool,
    pub inplace: bool,
}

impl RunContext {
    /// Internal-path globs are matched relative to `root`.
    pub fn from_config(config: &IdtConfig, root: &Path) -> anyhow::Result<Self> {
        warn_ignored_combinations(config);

        let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let internal = InternalPaths::new(config.paths.internal_patterns())
            .context("invalid internal path pattern")?
            .with_root(root);
        debug!(
            patterns = ?internal.patterns(),
            root = ?internal.root(),
            "internal path predicate"
        );

        let policy = Policy::new(&config.annotate.export_macro)?
            .with_annotate_classes(config.annotate.annotate_classes)
            .with_report_only(config.annotate.report_only)
            .with_internal_paths(internal)
            .with_reserved_records(config.paths.reserved_records.iter().cloned());

        let names = config.ignore.split_names();
        let ignore = if config.ignore.no_defaults {
            IgnoreList::build(Vec::new(), names)
        } else {
            IgnoreList::with_defaults(names)
        };

        let macros = MacroSet::new(
            config
                .annotate
                .export_macros()
                .into_iter()
                .map(String::from),
            config.annotate.transparent_macros.iter().cloned(),
        );
        let loader = UnitLoader::new(
            LoaderOptions {
                include_dirs: config.paths.include_dirs.clone(),
                system_include_dirs: config.paths.system_include_dirs.clone(),
                follow_includes: true,
            },
            macros,
        );

        Ok(Self {
            apply_fixits: config.fixits.apply && !config.annotate.report_only,
            inplace: config.fixits.inplace,
            policy,
            ignore,
            loader,
        })
    }
}

fn warn_ignored_combinations(config: &IdtConfig) {
    if config.fixits.inplace && !config.fixits.apply {
        warn!("--inplace has no effect without --apply-fixits");
    }
    if config.fixits.apply && config.annotate.report_only {
        warn!("--apply-fixits is ignored in report-only mode");
    }
}

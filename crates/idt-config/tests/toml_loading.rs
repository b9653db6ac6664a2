//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed file and env var manipulation.

use figment::Jail;
use idt_config::IdtConfig;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn project_config(jail: &Jail, contents: &str) -> figment::Result<()> {
    std::fs::create_dir_all(jail.directory().join(".idt")).map_err(|e| e.to_string())?;
    jail.create_file(".idt/config.toml", contents)?;
    Ok(())
}

#[test]
fn loads_project_config() {
    Jail::expect_with(|jail| {
        project_config(
            jail,
            r#"
[annotate]
export_macro = "LIB_ABI"
annotate_classes = false
known_export_macros = ["LIB_LEGACY_API"]

[fixits]
apply = true
inplace = true

[ignore]
names = ["f,g", "h"]

[paths]
internal = ["**/detail/**"]
include_dirs = ["include"]
system_include_dirs = ["/opt/sdk/include"]
"#,
        )?;

        let config = IdtConfig::from_figment(IdtConfig::figment_with(None, Path::new(".")))
            .expect("config should load");

        assert_eq!(config.annotate.export_macro, "LIB_ABI");
        assert!(!config.annotate.annotate_classes);
        assert_eq!(config.annotate.export_macros(), vec!["LIB_ABI", "LIB_LEGACY_API"]);
        assert!(config.fixits.apply);
        assert!(config.fixits.inplace);
        assert_eq!(config.ignore.split_names(), vec!["f", "g", "h"]);
        assert_eq!(config.paths.internal_patterns(), vec!["**/detail/**"]);
        assert_eq!(config.paths.include_dirs, vec![PathBuf::from("include")]);
        assert_eq!(
            config.paths.system_include_dirs,
            vec![PathBuf::from("/opt/sdk/include")]
        );
        Ok(())
    });
}

#[test]
fn missing_sections_use_defaults() {
    Jail::expect_with(|jail| {
        project_config(
            jail,
            r#"
[annotate]
export_macro = "LIB_ABI"
"#,
        )?;

        let config = IdtConfig::from_figment(IdtConfig::figment_with(None, Path::new(".")))
            .expect("config should load");

        assert!(config.annotate.annotate_classes);
        assert!(!config.annotate.report_only);
        assert!(!config.fixits.apply);
        assert!(config.ignore.names.is_empty());
        assert_eq!(
            config.paths.internal_patterns(),
            vec!["**/lib/**", "**/tools/**", "**/*.def"]
        );
        Ok(())
    });
}

#[test]
fn ignore_names_union_across_global_and_project() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "global.toml",
            r#"
[ignore]
names = ["from_global"]
"#,
        )?;
        project_config(
            jail,
            r#"
[annotate]
export_macro = "LIB_ABI"

[ignore]
names = ["from_project"]
"#,
        )?;

        let figment = IdtConfig::figment_with(Some(PathBuf::from("global.toml")), Path::new("."));
        let config = IdtConfig::from_figment(figment).expect("config should load");

        assert_eq!(
            config.ignore.split_names(),
            vec!["from_global", "from_project"]
        );
        Ok(())
    });
}

#[test]
fn missing_export_macro_is_fatal() {
    Jail::expect_with(|_jail| {
        let result = IdtConfig::from_figment(IdtConfig::figment_with(None, Path::new(".")));
        assert!(result.is_err());
        Ok(())
    });
}

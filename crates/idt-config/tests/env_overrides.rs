use figment::Jail;
use idt_config::IdtConfig;
use std::path::Path;

#[test]
fn env_provides_export_macro() {
    Jail::expect_with(|jail| {
        jail.set_env("IDT_ANNOTATE__EXPORT_MACRO", "ENV_ABI");
        jail.set_env("IDT_FIXITS__APPLY", "true");

        let config = IdtConfig::from_figment(IdtConfig::figment_with(None, Path::new(".")))
            .expect("config loads");
        assert_eq!(config.annotate.export_macro, "ENV_ABI");
        assert!(config.fixits.apply);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".idt")).map_err(|e| e.to_string())?;
        jail.create_file(
            ".idt/config.toml",
            r#"
[annotate]
export_macro = "FILE_ABI"
annotate_classes = true
"#,
        )?;
        jail.set_env("IDT_ANNOTATE__EXPORT_MACRO", "ENV_ABI");
        jail.set_env("IDT_ANNOTATE__ANNOTATE_CLASSES", "false");

        let config = IdtConfig::from_figment(IdtConfig::figment_with(None, Path::new(".")))
            .expect("config loads");
        assert_eq!(config.annotate.export_macro, "ENV_ABI");
        assert!(!config.annotate.annotate_classes);
        Ok(())
    });
}

#[test]
fn unrelated_idt_variables_are_tolerated() {
    Jail::expect_with(|jail| {
        jail.set_env("IDT_LOG", "debug");
        jail.set_env("IDT_ANNOTATE__EXPORT_MACRO", "ENV_ABI");

        let config = IdtConfig::from_figment(IdtConfig::figment_with(None, Path::new(".")))
            .expect("config loads");
        assert_eq!(config.annotate.export_macro, "ENV_ABI");
        Ok(())
    });
}

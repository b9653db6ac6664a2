//! Serde roundtrip and JsonSchema validation tests for report types.

use idt_core::{FixIt, Remark, RemarkKind, Report, Severity, SkipReason, Verdict};
use pretty_assertions::assert_eq;
use schemars::schema_for;
use std::path::PathBuf;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

fn sample_report() -> Report {
    Report {
        translation_units: 2,
        parse_failures: 1,
        remarks: vec![
            Remark {
                file: PathBuf::from("include/lib.h"),
                line: 7,
                column: 1,
                severity: Severity::Remark,
                kind: RemarkKind::UnexportedPublicInterface,
                name: "ns::open".to_string(),
                fixit: Some(FixIt {
                    file: PathBuf::from("include/lib.h"),
                    offset: 120,
                    line: 7,
                    column: 1,
                    text: "LIB_ABI ".to_string(),
                }),
            },
            Remark {
                file: PathBuf::from("include/lib.h"),
                line: 12,
                column: 3,
                severity: Severity::Remark,
                kind: RemarkKind::ExportedPrivateInterface,
                name: "handle::reset".to_string(),
                fixit: None,
            },
        ],
        rewritten_files: vec![PathBuf::from("include/lib.h")],
    }
}

#[test]
fn report_roundtrips_through_json() {
    let report = sample_report();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let recovered: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, report);
}

#[test]
fn report_matches_its_schema() {
    let schema = serde_json::to_value(schema_for!(Report)).unwrap();
    let instance = serde_json::to_value(sample_report()).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "schema violations: {errors:?}");
}

#[test]
fn remark_without_fixit_omits_the_field() {
    let report = sample_report();
    let json = serde_json::to_value(&report.remarks[1]).unwrap();
    assert!(json.get("fixit").is_none());
    assert_eq!(json["kind"], "exported_private_interface");
}

#[test]
fn verdict_matches_its_schema() {
    let schema = serde_json::to_value(schema_for!(Verdict)).unwrap();
    for verdict in [
        Verdict::skip(SkipReason::IgnoredName),
        Verdict::FlagOverExportedPrivate,
    ] {
        let instance = serde_json::to_value(&verdict).unwrap();
        let errors = validate_against_schema(&schema, &instance);
        assert!(errors.is_empty(), "{verdict:?}: {errors:?}");
    }
}

mod common;
use crate::common::builders::{ActionConfigBuilder, ManifestBuilder};

use std::io::Write;

use dagrun::config::loader::{load_and_validate, load_from_path};
use dagrun::config::validate::validate;
use dagrun::errors::DagrunError;

#[test]
fn accepts_valid_manifest() {
    let manifest = ManifestBuilder::new()
        .with_action("build", ActionConfigBuilder::new("echo build").build())
        .with_action(
            "test",
            ActionConfigBuilder::new("echo test").after("build").build(),
        )
        .build();

    assert!(validate(&manifest).is_ok());
}

#[test]
fn rejects_empty_manifest() {
    let manifest = ManifestBuilder::new().build();
    let err = validate(&manifest).unwrap_err();
    assert!(matches!(err, DagrunError::ConfigError(_)));
}

#[test]
fn rejects_zero_workers() {
    let manifest = ManifestBuilder::new()
        .with_workers(0)
        .with_action("a", ActionConfigBuilder::new("echo a").build())
        .build();
    let err = validate(&manifest).unwrap_err();
    assert!(matches!(err, DagrunError::ConfigError(_)));
}

#[test]
fn rejects_unknown_dependency() {
    let manifest = ManifestBuilder::new()
        .with_action(
            "a",
            ActionConfigBuilder::new("echo a").after("missing").build(),
        )
        .build();
    let err = validate(&manifest).unwrap_err();
    assert!(matches!(err, DagrunError::ConfigError(_)));
}

#[test]
fn rejects_self_dependency() {
    let manifest = ManifestBuilder::new()
        .with_action("a", ActionConfigBuilder::new("echo a").after("a").build())
        .build();
    let err = validate(&manifest).unwrap_err();
    assert!(matches!(err, DagrunError::ConfigError(_)));
}

#[test]
fn rejects_dependency_cycle() {
    let manifest = ManifestBuilder::new()
        .with_action("a", ActionConfigBuilder::new("echo a").after("c").build())
        .with_action("b", ActionConfigBuilder::new("echo b").after("a").build())
        .with_action("c", ActionConfigBuilder::new("echo c").after("b").build())
        .build();
    let err = validate(&manifest).unwrap_err();
    assert!(matches!(err, DagrunError::DagCycle(_)));
}

#[test]
fn loads_manifest_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"
[pool]
workers = 2

[action.first]
cmd = "echo first"

[action.second]
cmd = "echo second"
after = ["first"]
dedicated = true
"#
    )
    .expect("write manifest");

    let manifest = load_and_validate(file.path()).expect("manifest is valid");
    assert_eq!(manifest.pool.workers, 2);
    assert_eq!(manifest.action.len(), 2);
    assert_eq!(manifest.action["second"].after, vec!["first"]);
    assert!(manifest.action["second"].dedicated);
    assert!(!manifest.action["first"].dedicated);
}

#[test]
fn load_reports_toml_errors() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "not valid toml [").expect("write manifest");

    let err = load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, DagrunError::TomlError(_)));
}

#[test]
fn load_reports_missing_file() {
    let err = load_from_path("does/not/exist/Dagrun.toml").unwrap_err();
    assert!(matches!(err, DagrunError::IoError(_)));
}

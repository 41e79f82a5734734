use assert_cmd::Command;
use cloudconfig::test_utils::fixtures::INVALID_CLOUD_CONFIG;
use predicates::prelude::*;

use crate::common::{ManifestBuilder, TestProject};

#[test]
fn test_missing_manifest() {
    let project = TestProject::new().unwrap();

    project
        .run(&["plan"])
        .unwrap()
        .assert_code(1)
        .assert_stderr_contains("Project file cloudconfig.toml not found")
        .assert_stderr_contains("--manifest-path");
}

#[test]
fn test_unknown_resource_name() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&ManifestBuilder::new().inline("hello", "hello", &[]).build()).unwrap();

    Command::from_std(project.command())
        .args(["apply", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Resource 'missing' not found"))
        .stderr(predicate::str::contains("[resources.missing]"));
}

#[test]
fn test_invalid_manifest_syntax() {
    let project = TestProject::new().unwrap();
    project.write_manifest("[resources.hello\ntemplate = \"x\"\n").unwrap();

    project
        .run(&["plan"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid project file syntax");
}

#[test]
fn test_unknown_manifest_field() {
    let project = TestProject::new().unwrap();
    project.write_manifest("[resources.hello]\ntemplate = \"x\"\ncompression = true\n").unwrap();

    project.run(&["plan"]).unwrap().assert_failure().assert_stderr_contains("compression");
}

#[test]
fn test_non_string_variable() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest("[resources.web]\ntemplate = \"count: ${var.count}\"\nvalidate = false\n\n[resources.web.vars]\ncount = 3\n")
        .unwrap();

    project
        .run(&["apply"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to create resource 'web'")
        .assert_stderr_contains("\"count\"");

    assert!(!project.state_path().exists());
}

#[test]
fn test_undefined_variable() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(&ManifestBuilder::new().inline_with("hello", "hello ${var.nmae}", &[("name", "world")], &["validate = false"]).build())
        .unwrap();

    project
        .run(&["render", "hello"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to render resource 'hello'")
        .assert_stderr_contains("Template evaluation error");
}

#[test]
fn test_validation_failure_blocks_create() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&ManifestBuilder::new().inline("bad", INVALID_CLOUD_CONFIG, &[]).build()).unwrap();

    project
        .run(&["apply"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to create resource 'bad'")
        .assert_stderr_contains("invalid value sometimes");

    assert!(!project.state_path().exists());
}

#[test]
fn test_validation_failure_keeps_previous_state() {
    let project = TestProject::new().unwrap();
    let manifest = |template: &str| ManifestBuilder::new().inline("node", template, &[]).build();

    project.write_manifest(&manifest("#cloud-config\nhostname: node-1\n")).unwrap();
    project.run(&["apply"]).unwrap().assert_success();
    let before = project.read_state();

    project.write_manifest(&manifest(INVALID_CLOUD_CONFIG)).unwrap();
    project
        .run(&["apply"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to update resource 'node'");

    assert_eq!(project.read_state(), before);
}

#[test]
fn test_validation_can_be_disabled() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(&ManifestBuilder::new().inline_with("bad", INVALID_CLOUD_CONFIG, &[], &["validate = false"]).build())
        .unwrap();

    project.run(&["apply"]).unwrap().assert_success().assert_stdout_contains("bad: created");
}

#[test]
fn test_corrupt_state_file() {
    let project = TestProject::new().unwrap();
    project.write_manifest(&ManifestBuilder::new().inline("hello", "#cloud-config\n", &[]).build()).unwrap();
    project.write_file("cloudconfig.state.toml", "version = [\n").unwrap();

    project
        .run(&["apply"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Invalid state file syntax");
}

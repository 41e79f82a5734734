use assert_cmd::Command;
use cloudconfig::test_utils::fixtures::{INVALID_CLOUD_CONFIG, WEB_RENDERED};
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_validate_valid_document() {
    let project = TestProject::new().unwrap();
    project.write_file("user-data.yaml", WEB_RENDERED).unwrap();

    project
        .run(&["validate", "user-data.yaml"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("user-data.yaml is valid");
}

#[test]
fn test_validate_does_not_need_a_project() {
    let project = TestProject::new().unwrap();
    project.write_file("script.sh", "#!/bin/bash\necho hello\n").unwrap();

    Command::from_std(project.command()).args(["validate", "script.sh"]).assert().success();
}

#[test]
fn test_validate_reports_entries() {
    let project = TestProject::new().unwrap();
    project.write_file("user-data.yaml", INVALID_CLOUD_CONFIG).unwrap();

    project
        .run(&["validate", "user-data.yaml"])
        .unwrap()
        .assert_code(1)
        .assert_stdout_contains("line 4: error: invalid value sometimes")
        .assert_stdout_contains("line 5: warning: unrecognized key \"bogus_key\"")
        .assert_stderr_contains("2 problem(s) found");
}

#[test]
fn test_validate_missing_header() {
    let project = TestProject::new().unwrap();
    project.write_file("user-data.yaml", "hostname: web-1\n").unwrap();

    Command::from_std(project.command())
        .args(["validate", "user-data.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("line 1: error: must be \"#cloud-config\""));
}

#[test]
fn test_validate_json_output() {
    let project = TestProject::new().unwrap();
    project.write_file("user-data.yaml", INVALID_CLOUD_CONFIG).unwrap();

    let output = project.run(&["validate", "user-data.yaml", "--format", "json"]).unwrap();
    output.assert_failure();

    let json: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["file"], "user-data.yaml");

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "error");
    assert_eq!(entries[0]["line"], 4);
    assert_eq!(entries[1]["kind"], "warning");
    assert_eq!(entries[1]["line"], 5);
}

#[test]
fn test_validate_missing_file() {
    let project = TestProject::new().unwrap();

    project.run(&["validate", "nope.yaml"]).unwrap().assert_failure().assert_stderr_contains("error");
}

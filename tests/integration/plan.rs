use assert_cmd::Command;
use cloudconfig::test_utils::fixtures::{WEB_TEMPLATE, project_manifest};
use predicates::prelude::*;

use crate::common::TestProject;

fn fixture_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_file("web.yaml", WEB_TEMPLATE).unwrap();
    project.write_manifest(&project_manifest("web.yaml")).unwrap();
    project
}

#[test]
fn test_plan_fresh_project() {
    let project = fixture_project();

    project
        .run(&["plan"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("+ hello (create)")
        .assert_stdout_contains("+ web (create)")
        .assert_stdout_contains("Plan: 2 to create, 0 to update, 0 unchanged.");

    assert!(!project.state_path().exists(), "plan must not write state");
}

#[test]
fn test_detailed_exitcode_reports_pending_changes() {
    let project = fixture_project();

    Command::from_std(project.command())
        .args(["plan", "--detailed-exitcode"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("2 to create"));

    project.run(&["apply"]).unwrap().assert_success();

    Command::from_std(project.command())
        .args(["plan", "--detailed-exitcode"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello (no changes)"))
        .stdout(predicate::str::contains("Plan: 0 to create, 0 to update, 2 unchanged."));
}

#[test]
fn test_plan_detects_drift() {
    let project = fixture_project();
    project.run(&["apply"]).unwrap().assert_success();

    project.write_file("web.yaml", &WEB_TEMPLATE.replace("hostname:", "hostname: prod-")).unwrap();

    project
        .run(&["plan", "--detailed-exitcode"])
        .unwrap()
        .assert_code(2)
        .assert_stdout_contains("~ web (update)")
        .assert_stdout_contains("hello (no changes)")
        .assert_stdout_contains("Plan: 0 to create, 1 to update, 1 unchanged.");
}

#[test]
fn test_plan_selected_resource() {
    let project = fixture_project();
    project.run(&["apply", "hello"]).unwrap().assert_success();

    Command::from_std(project.command())
        .args(["plan", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan: 0 to create, 0 to update, 1 unchanged."))
        .stdout(predicate::str::contains("web").not());
}

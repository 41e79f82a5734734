use assert_cmd::Command;
use cloudconfig::test_utils::fixtures::{WEB_RENDERED, WEB_TEMPLATE, project_manifest};
use predicates::prelude::*;

use crate::common::TestProject;

const HELLO_WORLD_ID: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

fn applied_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_file("web.yaml", WEB_TEMPLATE).unwrap();
    project.write_manifest(&project_manifest("web.yaml")).unwrap();
    project.run(&["apply"]).unwrap().assert_success();
    project
}

#[test]
fn test_show_recorded_state() {
    let project = applied_project();

    let output = project.run(&["show", "hello"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, format!("id: {HELLO_WORLD_ID}\nrendered:\nhello world\n"));
}

#[test]
fn test_show_decode() {
    let project = applied_project();

    project
        .run(&["show", "web", "--decode"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains(WEB_RENDERED);

    let raw = project.run(&["show", "web"]).unwrap();
    raw.assert_success();
    assert!(raw.stdout.contains("rendered:\nH4sI"));
}

#[test]
fn test_show_decode_rejects_plain_output() {
    let project = applied_project();

    project
        .run(&["show", "hello", "--decode"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Recorded output of 'hello' is not gzip+base64");
}

#[test]
fn test_destroy_single_resource() {
    let project = applied_project();

    project.run(&["destroy", "web"]).unwrap().assert_success().assert_stdout_contains("web: destroyed");

    assert!(project.recorded("web").is_none());
    assert!(project.recorded("hello").is_some());

    Command::from_std(project.command())
        .args(["show", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web: not provisioned"));
}

#[test]
fn test_destroy_then_plan_recreates() {
    let project = applied_project();

    project.run(&["destroy"]).unwrap().assert_success();
    assert!(project.recorded("hello").is_none());
    assert!(project.recorded("web").is_none());

    project
        .run(&["destroy"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("hello: not provisioned");

    project
        .run(&["plan"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("Plan: 2 to create, 0 to update, 0 unchanged.");

    project.run(&["apply"]).unwrap().assert_success().assert_stdout_contains("hello: created");
}

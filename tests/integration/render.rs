use cloudconfig::compression::decompress;
use cloudconfig::identity::compute_identity;
use cloudconfig::test_utils::fixtures::{WEB_RENDERED, WEB_TEMPLATE, project_manifest};

use crate::common::TestProject;

fn fixture_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_file("web.yaml", WEB_TEMPLATE).unwrap();
    project.write_manifest(&project_manifest("web.yaml")).unwrap();
    project
}

#[test]
fn test_render_to_stdout() {
    let project = fixture_project();

    let output = project.run(&["render", "hello"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "hello world\n");
    assert!(!project.state_path().exists(), "render must not write state");
}

#[test]
fn test_render_compressed_output_decodes() {
    let project = fixture_project();

    let output = project.run(&["render", "web"]).unwrap();
    output.assert_success();
    assert_eq!(decompress(output.stdout.trim_end()).unwrap(), WEB_RENDERED);
}

#[test]
fn test_render_is_deterministic() {
    let project = fixture_project();

    let first = project.run(&["render", "web"]).unwrap();
    let second = project.run(&["render", "web"]).unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_render_to_file() {
    let project = fixture_project();
    let target = project.project_path().join("out").join("hello.txt");

    project
        .run(&["render", "hello", "--output", target.to_str().unwrap()])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("Wrote")
        .assert_stdout_contains(&compute_identity("hello world"));

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello world");
}

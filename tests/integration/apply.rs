use cloudconfig::compression::decompress;
use cloudconfig::identity::compute_identity;
use cloudconfig::test_utils::fixtures::{WEB_RENDERED, WEB_TEMPLATE, project_manifest};

use crate::common::{ManifestBuilder, TestProject};

const HELLO_WORLD_ID: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

fn fixture_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_file("templates/web.yaml", WEB_TEMPLATE).unwrap();
    project.write_manifest(&project_manifest("templates/web.yaml")).unwrap();
    project
}

#[test]
fn test_apply_creates_all_resources() {
    let project = fixture_project();

    project
        .run(&["apply"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("hello: created")
        .assert_stdout_contains("web: created");

    let hello = project.recorded("hello").expect("hello recorded");
    assert_eq!(hello["rendered"].as_str(), Some("hello world"));
    assert_eq!(hello["id"].as_str(), Some(HELLO_WORLD_ID));

    let web = project.recorded("web").expect("web recorded");
    let rendered = web["rendered"].as_str().unwrap();
    assert!(rendered.starts_with("H4sI"), "expected gzip+base64 output, got {rendered}");
    assert_eq!(decompress(rendered).unwrap(), WEB_RENDERED);
    assert_eq!(web["id"].as_str(), Some(compute_identity(rendered).as_str()));
}

#[test]
fn test_state_file_layout() {
    let project = fixture_project();
    project.run(&["apply", "hello"]).unwrap().assert_success();

    let state = project.read_state();
    assert!(state.starts_with("# Managed by cloudconfig"));
    assert_eq!(project.state_toml()["version"].as_integer(), Some(1));
    assert!(project.recorded("web").is_none());
}

#[test]
fn test_second_apply_is_unchanged() {
    let project = fixture_project();
    project.run(&["apply"]).unwrap().assert_success();
    let before = project.read_state();

    project
        .run(&["apply"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("hello: unchanged")
        .assert_stdout_contains("web: unchanged");

    assert_eq!(project.read_state(), before);
}

#[test]
fn test_changed_variables_update_identity() {
    let project = TestProject::new().unwrap();
    project
        .write_manifest(&ManifestBuilder::new().inline_with("hello", "hello ${var.name}", &[("name", "world")], &["gzip = false", "validate = false"]).build())
        .unwrap();
    project.run(&["apply"]).unwrap().assert_success();

    project
        .write_manifest(&ManifestBuilder::new().inline_with("hello", "hello ${var.name}", &[("name", "mars")], &["gzip = false", "validate = false"]).build())
        .unwrap();
    project.run(&["apply"]).unwrap().assert_success().assert_stdout_contains("hello: updated");

    let hello = project.recorded("hello").unwrap();
    assert_eq!(hello["rendered"].as_str(), Some("hello mars"));
    assert_eq!(hello["id"].as_str(), Some(compute_identity("hello mars").as_str()));
    assert_ne!(hello["id"].as_str(), Some(HELLO_WORLD_ID));
}

#[test]
fn test_toggling_compression_is_an_update() {
    let project = TestProject::new().unwrap();
    let manifest = |gzip: &str| {
        ManifestBuilder::new()
            .inline_with("web", WEB_TEMPLATE, &[("hostname", "web-1"), ("strategy", "reboot")], &[gzip])
            .build()
    };

    project.write_manifest(&manifest("gzip = true")).unwrap();
    project.run(&["apply"]).unwrap().assert_success();
    let compressed = project.recorded("web").unwrap()["id"].as_str().unwrap().to_string();

    project.write_manifest(&manifest("gzip = false")).unwrap();
    project.run(&["apply"]).unwrap().assert_success().assert_stdout_contains("web: updated");

    let web = project.recorded("web").unwrap();
    assert!(web["rendered"].as_str().unwrap().starts_with("#cloud-config"));
    assert_ne!(web["id"].as_str(), Some(compressed.as_str()));
}

#[test]
fn test_manifest_found_from_subdirectory() {
    let project = fixture_project();
    let nested = project.project_path().join("nested").join("deeper");
    std::fs::create_dir_all(&nested).unwrap();

    let output = project.command().arg("apply").arg("hello").current_dir(&nested).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(project.recorded("hello").is_some());
}

#[test]
fn test_explicit_paths() {
    let project = TestProject::new().unwrap();
    let manifest = project
        .write_file(
            "infra/custom.toml",
            &ManifestBuilder::new().inline_with("hello", "hello ${var.name}", &[("name", "world")], &["gzip = false", "validate = false"]).build(),
        )
        .unwrap();
    let state = project.project_path().join("out").join("state.toml");

    project
        .run(&["apply", "--manifest-path", manifest.to_str().unwrap(), "--state-path", state.to_str().unwrap()])
        .unwrap()
        .assert_success();

    let content = std::fs::read_to_string(&state).unwrap();
    assert!(content.contains(HELLO_WORLD_ID));
    assert!(!project.state_path().exists());
}

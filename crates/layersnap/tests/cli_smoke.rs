use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const SCENE: &str = r#"{
  "selection": [
    {
      "name": "Root",
      "kind": "FRAME",
      "children": [
        { "name": "Btn: Primary/Large", "kind": "COMPONENT" },
        { "name": "Icon / Close", "kind": "COMPONENT" }
      ]
    }
  ]
}"#;

#[test]
fn help_displays_usage() {
    Command::cargo_bin("layersnap")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn export_writes_images_and_manifest() {
    let temp = tempfile::tempdir().expect("temp dir");
    let scene = temp.path().join("scene.json");
    fs::write(&scene, SCENE).expect("write scene");
    let out = temp.path().join("out");

    Command::cargo_bin("layersnap")
        .expect("binary exists")
        .current_dir(temp.path())
        .args(["export", "--scene"])
        .arg(&scene)
        .args(["--depth", "1", "--out"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("Btn__Primary_Large.png").exists());
    assert!(out.join("Icon___Close.png").exists());

    let manifest = fs::read_to_string(out.join("manifest.json")).expect("manifest written");
    assert!(manifest.contains("Btn: Primary/Large"));
    assert!(manifest.contains("Btn__Primary_Large.png"));
}

#[test]
fn export_of_empty_selection_fails() {
    let temp = tempfile::tempdir().expect("temp dir");
    let scene = temp.path().join("scene.json");
    fs::write(&scene, r#"{ "selection": [] }"#).expect("write scene");

    Command::cargo_bin("layersnap")
        .expect("binary exists")
        .current_dir(temp.path())
        .args(["export", "--scene"])
        .arg(&scene)
        .assert()
        .failure()
        .stderr(predicate::str::contains("select at least one"));
}

#[test]
fn inspect_lists_targets_at_depth() {
    let temp = tempfile::tempdir().expect("temp dir");
    let scene = temp.path().join("scene.json");
    fs::write(&scene, SCENE).expect("write scene");

    Command::cargo_bin("layersnap")
        .expect("binary exists")
        .current_dir(temp.path())
        .args(["inspect", "--scene"])
        .arg(&scene)
        .args(["--depth", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 node(s) at depth 1"));
}

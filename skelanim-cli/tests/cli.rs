//! CLI integration tests
//!
//! Each test writes a scene into a temporary directory and runs the real
//! binary against it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CHAIN_SCENE: &str = include_str!("../../crates/skelanim/tests/data/chain.json");

fn write_scene(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("scene.json");
    fs::write(&path, contents).unwrap();
    path
}

fn skelanim() -> Command {
    Command::cargo_bin("skelanim").unwrap()
}

#[test]
fn test_info_lists_clips() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .arg("info")
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes:     4"))
        .stdout(predicate::str::contains("wave"))
        .stdout(predicate::str::contains("nod"));
}

#[test]
fn test_info_detailed_shows_channels() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .args(["info", "--detailed"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("body_skin (3 joints): root, spine, head"))
        .stdout(predicate::str::contains("Rotation"));
}

#[test]
fn test_tree_renders_hierarchy() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .args(["tree", "--no-color", "--compact"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("scene.json"))
        .stdout(predicate::str::contains("└── 🦴 head"))
        .stdout(predicate::str::contains("prop"));
}

#[test]
fn test_tree_depth_limit() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .args(["tree", "--no-color", "--depth", "1"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("root"))
        .stdout(predicate::str::contains("spine").not());
}

#[test]
fn test_play_json_frames() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    let output = skelanim()
        .args(["play", "--frames", "3", "--fps", "10", "--format", "json"])
        .arg(&scene)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["clip"], "wave");
    let frames = report["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2]["palette"].as_array().unwrap().len(), 3);
    let elapsed = frames[2]["elapsed"].as_f64().unwrap();
    assert!((elapsed - 0.3).abs() < 1e-5);
}

#[test]
fn test_play_table_with_clip_and_capacity() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .args(["play", "--clip", "nod", "--max-joints", "2", "--frames", "1"])
        .arg(&scene)
        .assert()
        .success()
        .stdout(predicate::str::contains("Clip: nod"))
        .stdout(predicate::str::contains("palette: 2/2 joints"));
}

#[test]
fn test_play_unknown_clip_fails() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .args(["play", "--clip", "swim"])
        .arg(&scene)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Clip 'swim' not found"));
}

#[test]
fn test_verbose_flag_enables_info_logging() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, CHAIN_SCENE);

    skelanim()
        .env_remove("RUST_LOG")
        .args(["-v", "info"])
        .arg(&scene)
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading scene from"));

    skelanim()
        .env_remove("RUST_LOG")
        .arg("info")
        .arg(&scene)
        .assert()
        .success()
        .stderr(predicate::str::contains("Loading scene from").not());
}

#[test]
fn test_invalid_scene_fails() {
    let dir = TempDir::new().unwrap();
    let scene = write_scene(&dir, "{ \"nodes\": [");

    skelanim()
        .arg("info")
        .arg(&scene)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load scene"));
}

#[test]
fn test_missing_scene_fails() {
    let dir = TempDir::new().unwrap();

    skelanim()
        .arg("info")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure();
}

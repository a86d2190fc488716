#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn skilltree(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("skilltree").unwrap();
    cmd.current_dir(dir.path())
        .env("SKILLTREE_ROOT", dir.path())
        .env("SKILLTREE_USER", "ana");
    cmd
}

fn init(dir: &TempDir) {
    skilltree(dir).arg("init").assert().success();
}

fn json_of(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Create an area; returns (container id, level-1 skill ids in y order).
fn create_area(dir: &TempDir) -> (String, Vec<String>) {
    let body = json_of(skilltree(dir).args(["container", "create", "area", "Climbing"]));
    let id = body["container"]["id"].as_str().unwrap().to_string();
    let skills = body["skills"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    (id, skills)
}

fn master(dir: &TempDir, id: &str) {
    skilltree(dir)
        .args(["skill", "edit", id, "--status", "mastered", "--system"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_db() {
    let dir = TempDir::new().unwrap();
    skilltree(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    assert!(dir.path().join(".skilltree/config.yaml").exists());
    assert!(dir.path().join(".skilltree/skills.redb").exists());
}

#[test]
fn init_twice_keeps_config() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    skilltree(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();
    skilltree(&dir)
        .args(["container", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("skilltree init"));
}

// ---------------------------------------------------------------------------
// containers
// ---------------------------------------------------------------------------

#[test]
fn create_area_generates_level_one() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, skills) = create_area(&dir);
    assert_eq!(skills.len(), 5);

    let listed = json_of(skilltree(&dir).args(["container", "list"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["unlocked_level"], 1);
}

#[test]
fn container_list_is_per_user() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    create_area(&dir);
    skilltree(&dir)
        .args(["container", "list"])
        .env("SKILLTREE_USER", "bo")
        .assert()
        .success()
        .stdout(predicate::str::contains("No containers."));
}

#[test]
fn unknown_kind_is_rejected_by_the_parser() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    skilltree(&dir)
        .args(["container", "create", "goal", "x"])
        .assert()
        .failure();
}

#[test]
fn other_user_cannot_read_skills() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, _) = create_area(&dir);
    skilltree(&dir)
        .args(["skill", "list", &id])
        .env("SKILLTREE_USER", "bo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not own"));
}

#[test]
fn delete_container_then_show_fails() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, _) = create_area(&dir);
    skilltree(&dir)
        .args(["container", "delete", &id])
        .assert()
        .success();
    skilltree(&dir)
        .args(["container", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("container not found"));
}

// ---------------------------------------------------------------------------
// skills
// ---------------------------------------------------------------------------

#[test]
fn sixth_skill_in_a_level_fails() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, _) = create_area(&dir);
    skilltree(&dir)
        .args(["skill", "add", &id, "Overhang"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("level 1 already holds 5 skills"));
}

#[test]
fn mastering_the_gate_opens_level_two() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, skills) = create_area(&dir);
    for s in &skills[1..4] {
        master(&dir, s);
    }
    skilltree(&dir)
        .args(["skill", "edit", &skills[4], "--status", "available", "--system"])
        .assert()
        .success();

    let toggled = json_of(skilltree(&dir).args(["skill", "toggle", &skills[4]]));
    assert_eq!(toggled["outcome"], "changed");
    assert_eq!(toggled["level_change"]["level"], 2);

    let listed = json_of(skilltree(&dir).args(["skill", "list", &id]));
    assert_eq!(listed.as_array().unwrap().len(), 10);
}

#[test]
fn gate_toggle_is_refused_while_level_is_open() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (_, skills) = create_area(&dir);
    skilltree(&dir)
        .args(["skill", "edit", &skills[4], "--status", "available", "--system"])
        .assert()
        .success();
    skilltree(&dir)
        .args(["skill", "toggle", &skills[4]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejected"));
}

#[test]
fn insert_shifts_and_delete_restores() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, skills) = create_area(&dir);

    let before = json_of(skilltree(&dir).args(["skill", "list", &id]));
    let last_y = before[4]["y"].as_i64().unwrap();

    let inserted = json_of(skilltree(&dir).args(["skill", "insert", &skills[1], "Smearing"]));
    let new_id = inserted["id"].as_str().unwrap().to_string();

    let shifted = json_of(skilltree(&dir).args(["skill", "list", &id]));
    let gate = shifted
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == skills[4].as_str())
        .unwrap();
    assert_eq!(gate["y"].as_i64().unwrap(), last_y + 150);

    skilltree(&dir)
        .args(["skill", "delete", &new_id])
        .assert()
        .success();
    let restored = json_of(skilltree(&dir).args(["skill", "list", &id]));
    assert_eq!(restored[4]["y"].as_i64().unwrap(), last_y);
}

#[test]
fn move_at_edge_reports_no_change() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (_, skills) = create_area(&dir);
    let moved = json_of(skilltree(&dir).args(["skill", "move", &skills[0], "up"]));
    assert_eq!(moved["moved"], false);
}

// ---------------------------------------------------------------------------
// levels, reconcile, check
// ---------------------------------------------------------------------------

#[test]
fn generate_level_twice_creates_once() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, _) = create_area(&dir);
    let first = json_of(skilltree(&dir).args(["level", "generate", &id, "2"]));
    assert_eq!(first["created"], true);
    let second = json_of(skilltree(&dir).args(["level", "generate", &id, "2"]));
    assert_eq!(second["created"], false);
    assert_eq!(second["skills"].as_array().unwrap().len(), 5);
}

#[test]
fn check_reports_consistent_container() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let (id, _) = create_area(&dir);
    skilltree(&dir)
        .args(["check", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent"));
}

#[test]
fn reconcile_all_runs_without_a_container() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    create_area(&dir);
    let body = json_of(skilltree(&dir).arg("reconcile"));
    assert!(body["changed"].is_array());
}

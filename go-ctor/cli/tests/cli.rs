use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SOMETHING: &str = "package test

import \"io\"

type Something struct {
\tsome   string
\twriter io.Writer
}
";

#[allow(deprecated)] // We need Command struct to set env
fn goctor_cmd() -> Command {
    let mut cmd = Command::cargo_bin("goctor").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_flag() {
    goctor_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("constructor"))
        .stdout(predicate::str::contains("--type"));
}

#[test]
fn test_version_flag() {
    goctor_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("goctor"));
}

#[test]
fn test_missing_type_flag_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    goctor_cmd()
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--type"));
    assert_eq!(fs::read_to_string(&path).unwrap(), SOMETHING);
}

#[test]
fn test_missing_file_argument_is_usage_error() {
    goctor_cmd()
        .args(["--type", "Something"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("FILE"));
}

#[test]
fn test_generates_constructor_in_place() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    goctor_cmd()
        .arg(&path)
        .args(["--type", "Something"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "NewSomething(some string, writer io.Writer) *Something",
        ));

    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.ends_with(
        "}\n\nfunc NewSomething(some string, writer io.Writer) *Something {\n\treturn &Something{some: some, writer: writer}\n}\n"
    ));
}

#[test]
fn test_second_run_reports_duplicate() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    goctor_cmd().arg(&path).args(["-t", "Something"]).assert().success();
    let after_first = fs::read_to_string(&path).unwrap();

    goctor_cmd()
        .arg(&path)
        .args(["-t", "Something"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    let output = goctor_cmd()
        .arg(&path)
        .args(["--type", "Something", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["constructor"], "NewSomething");
    assert_eq!(report["line"], 10);
    assert_eq!(report["type_found"], true);
    assert_eq!(report["parameters"][1], "writer io.Writer");
}

#[test]
fn test_strict_rejects_undeclared_type() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    goctor_cmd()
        .arg(&path)
        .args(["--type", "Missing", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing"));
    assert_eq!(fs::read_to_string(&path).unwrap(), SOMETHING);
}

#[test]
fn test_undeclared_type_warns_without_strict() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    goctor_cmd()
        .arg(&path)
        .args(["--type", "Missing", "--plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NewMissing() *Missing"))
        .stdout(predicate::str::contains("warning: type Missing is not declared"));
}

#[test]
fn test_invalid_go_fails_and_leaves_file() {
    let dir = TempDir::new().unwrap();
    let broken = "package broken\n\ntype Half struct {\n\tname string\n";
    let path = create_temp_file(&dir, "broken.go", broken);

    goctor_cmd()
        .arg(&path)
        .args(["--type", "Half"])
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&path).unwrap(), broken);
}

#[test]
fn test_invalid_type_name_fails() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_file(&dir, "something.go", SOMETHING);

    goctor_cmd()
        .arg(&path)
        .args(["--type", "not-a-name"])
        .assert()
        .failure();
}

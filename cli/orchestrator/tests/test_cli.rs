use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;

fn microgen() -> Command { Command::new(assert_cmd::cargo::cargo_bin!("microgen")) }

fn write_service(dir: &Path, interface_docs: &[&str]) -> PathBuf {
    let string = json!({ "kind": "name", "name": "string" });
    let model = json!({
        "package": "stringsvc",
        "interfaces": [{
            "name": "StringService",
            "docs": interface_docs,
            "methods": [{
                "name": "Uppercase",
                "args": [
                    { "name": "ctx", "type": {
                        "kind": "import", "package": "context",
                        "next": { "kind": "name", "name": "Context" } } },
                    { "name": "s", "type": string },
                ],
                "results": [
                    { "name": "ans", "type": string },
                    { "name": "err", "type": { "kind": "name", "name": "error" } },
                ],
            }],
        }],
    });
    let path = dir.join("service.json");
    fs::write(&path, serde_json::to_string_pretty(&model).expect("serialize model"))
        .expect("write model");
    path
}

#[test]
fn test_generates_core_files() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// @microgen"]);

    microgen()
        .arg("--file")
        .arg(&file)
        .args(["--package", "github.com/acme/stringsvc"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("all files successfully generated"));

    let exchanges = fs::read_to_string(dir.path().join("transport/exchanges.microgen.go"))
        .expect("exchanges written next to the model");
    assert!(exchanges.contains("UppercaseRequest struct {"));
    assert!(dir.path().join("transport/endpoints.microgen.go").exists());
    assert!(dir.path().join("transport/client.microgen.go").exists());
}

#[test]
fn test_dry_run_prints_plan() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// @microgen middleware"]);
    let out = dir.path().join("gen");

    microgen()
        .arg("--file")
        .arg(&file)
        .arg("--out")
        .arg(&out)
        .args(["--package", "github.com/acme/stringsvc", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("middleware.microgen.go: planned (middleware)"))
        .stdout(predicate::str::contains("exchanges.microgen.go: planned (exchanges)"));

    assert!(!out.exists());
}

#[test]
fn test_missing_tag_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// StringService does things."]);

    microgen()
        .arg("--file")
        .arg(&file)
        .args(["--package", "github.com/acme/stringsvc"])
        .env_remove("RUST_LOG")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not find interface with @microgen tag"))
        .stderr(predicate::str::contains("StringService"));
}

#[test]
fn test_planning_failure_names_missing_prerequisite() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// @microgen grpc"]);

    microgen()
        .arg("--file")
        .arg(&file)
        .args(["--package", "github.com/acme/stringsvc"])
        .env_remove("RUST_LOG")
        .assert()
        .failure()
        .stderr(predicate::str::contains("@protobuf"));

    assert!(!dir.path().join("transport").exists());
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// @microgen"]);

    microgen()
        .arg("--file")
        .arg(&file)
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_config_file_supplies_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// @microgen"]);
    let config = dir.path().join("microgen.toml");
    fs::write(
        &config,
        "[generation]\nimport_package = \"github.com/acme/stringsvc\"\nemit_entry_point = true\n",
    )
    .expect("write config");

    microgen().arg("--file").arg(&file).arg("--config").arg(&config).assert().success();

    let main = fs::read_to_string(dir.path().join("cmd/string_service/main.go"))
        .expect("entry point requested by the config file");
    assert!(main.contains("package main"));
}

#[test]
fn test_import_package_from_go_mod() {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let file = write_service(dir.path(), &["// @microgen"]);
    fs::write(dir.path().join("go.mod"), "module github.com/acme/stringsvc\n")
        .expect("write go.mod");

    microgen().arg("--file").arg(&file).assert().success();

    let endpoints = fs::read_to_string(dir.path().join("transport/endpoints.microgen.go"))
        .expect("endpoints written");
    assert!(endpoints.contains("\"github.com/acme/stringsvc\""));
}

//! End-to-end runs of the `holocron` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn holocron(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("holocron").expect("binary");
    cmd.arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("--edits")
        .arg(dir.path().join("edits.json"))
        .arg("--no-color")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("holocron")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn edits_without_store_prints_empty_object() {
    let dir = TempDir::new().expect("temp dir");
    holocron(&dir)
        .arg("edits")
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn edits_reads_existing_store() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("edits.json"),
        r#"{"1":{"name":"Luke Mod"}}"#,
    )
    .expect("seed edits");

    holocron(&dir)
        .args(["edits", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Luke Mod\""));
}

#[test]
fn corrupt_store_is_treated_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("edits.json"), "{not json").expect("seed edits");

    holocron(&dir).arg("edits").assert().success().stdout("{}\n");
}

#[test]
fn unknown_field_is_rejected_before_any_request() {
    let dir = TempDir::new().expect("temp dir");
    holocron(&dir)
        .args(["--api-base", "http://127.0.0.1:9", "edit", "1", "--set", "homeworld=Naboo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("holocron.toml");
    std::fs::write(&config, "[api]\nbase_url = \"ftp://nowhere\"\n").expect("write config");

    Command::cargo_bin("holocron")
        .expect("binary")
        .arg("--config")
        .arg(&config)
        .arg("edits")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

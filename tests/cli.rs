mod common;

use assert_cmd::Command;
use common::{archive_names, workspace};
use predicates::prelude::*;

fn satpack() -> Command {
    let mut cmd = Command::cargo_bin("satpack").unwrap();
    cmd.env_remove("SATPACK_CONFIG").env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_every_mode() {
    satpack()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--binaries")
                .and(predicate::str::contains("--sources"))
                .and(predicate::str::contains("--project"))
                .and(predicate::str::contains("--salometools")),
        );
}

#[test]
fn a_mode_is_required() {
    let ws = workspace(true);
    satpack()
        .arg("--config")
        .arg(ws.config_path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required argument"));
}

#[test]
fn config_can_come_from_the_environment() {
    let ws = workspace(true);
    satpack()
        .env("SATPACK_CONFIG", ws.config_path())
        .arg("--salometools")
        .assert()
        .success();
    let names = archive_names(&ws.package_dir().join("salomeTools.tgz"));
    assert!(names.iter().any(|n| n == "salomeTools/sat"));
    assert!(!names.iter().any(|n| n.starts_with("salomeTools/.git")));
}

#[test]
fn missing_products_fail_with_a_listing() {
    let ws = workspace(true);
    std::fs::remove_dir_all(ws.root().join("INSTALL/A")).unwrap();
    satpack()
        .arg("-c")
        .arg(ws.config_path())
        .arg("-b")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--------").and(predicate::str::contains("A")));
    assert!(!ws.package_dir().join("APP-CO7.tgz").exists());

    satpack()
        .arg("-c")
        .arg(ws.config_path())
        .args(["-b", "--force-creation"])
        .assert()
        .success();
}

#[test]
fn binary_package_with_a_name() {
    let ws = workspace(true);
    let out = ws.root().join("out/nightly");
    satpack()
        .arg("-c")
        .arg(ws.config_path())
        .arg("-b")
        .arg("-n")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("SHA-256"));
    let names = archive_names(&ws.root().join("out/nightly.tgz"));
    assert!(names.iter().any(|n| n == "salome"));
}

#[test]
fn project_conflicts_with_binaries() {
    let ws = workspace(true);
    satpack()
        .arg("-c")
        .arg(ws.config_path())
        .args(["-b", "-p", "salome"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Conflicting arguments"));
}

#[test]
fn malformed_property_filter() {
    let ws = workspace(true);
    satpack()
        .arg("-c")
        .arg(ws.config_path())
        .args(["-t", "--without-property", "is_doc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid arguments"));
}

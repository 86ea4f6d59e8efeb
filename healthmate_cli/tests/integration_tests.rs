//! Integration tests for the healthmate binary.
//!
//! These tests verify end-to-end behavior including:
//! - Storage directory bootstrap
//! - Catalog and entry log persistence
//! - Profile persistence

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI isolated from any real user config
fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("healthmate"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn cli_in(temp_dir: &TempDir, data_dir: &Path) -> Command {
    let mut cmd = cli(temp_dir);
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Nutrition tracking with plain-text storage",
        ));
}

#[test]
fn test_default_command_bootstraps_storage() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No profile saved yet."))
        .stdout(predicate::str::contains("Meal Options Loaded Successfully!"))
        .stdout(predicate::str::contains("Meal Entries Loaded Successfully!"));

    assert!(data_dir.is_dir());
    // Loading the profile creates an empty file
    let user_data = data_dir.join("user_data.txt");
    assert!(user_data.exists());
    assert_eq!(fs::read_to_string(&user_data).unwrap(), "");
    // Catalog and log are only written on save
    assert!(!data_dir.join("meal_options.csv").exists());
    assert!(!data_dir.join("meal_entries.csv").exists());
}

#[test]
fn test_meal_add_and_list() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args(["meal", "add", "--name", "porridge", "--calories", "350"])
        .assert()
        .success();
    cli_in(&temp_dir, &data_dir)
        .args(["meal", "add", "--calories", "250"])
        .assert()
        .success();

    let contents = fs::read_to_string(data_dir.join("meal_options.csv")).unwrap();
    assert_eq!(
        contents.lines().collect::<Vec<_>>(),
        vec!["porridge,350", ",250"]
    );

    cli_in(&temp_dir, &data_dir)
        .args(["meal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. porridge (350 kcal)"))
        .stdout(predicate::str::contains("2. (unnamed) (250 kcal)"));
}

#[test]
fn test_log_from_catalog_meal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args(["meal", "add", "--name", "salad", "--calories", "180"])
        .assert()
        .success();
    cli_in(&temp_dir, &data_dir)
        .args(["log", "add", "--meal", "salad", "--at", "2024-10-16T12:30:00"])
        .assert()
        .success();
    cli_in(&temp_dir, &data_dir)
        .args(["log", "add", "--calories", "90", "--at", "2024-10-16T15:00"])
        .assert()
        .success();

    let output = cli_in(&temp_dir, &data_dir)
        .args(["log", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "salad");
    assert_eq!(entries[0]["calories"], 180);
    assert_eq!(entries[0]["timestamp"], "2024-10-16T12:30:00");
    assert!(entries[1]["name"].is_null());
    assert_eq!(entries[1]["calories"], 90);

    cli_in(&temp_dir, &data_dir)
        .args(["log", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 270 kcal"));
}

#[test]
fn test_log_unknown_meal_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args(["log", "add", "--meal", "ghost"])
        .assert()
        .failure();

    assert!(!data_dir.join("meal_entries.csv").exists());
}

#[test]
fn test_log_invalid_timestamp_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args(["log", "add", "--calories", "100", "--at", "noon"])
        .assert()
        .failure();
}

#[test]
fn test_profile_set_and_show() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args([
            "profile", "set", "--height", "170.5", "--weight", "65.2", "--male", "--age", "30",
            "--goal", "lose weight",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved."));

    assert_eq!(
        fs::read_to_string(data_dir.join("user_data.txt")).unwrap(),
        "170.5\n65.2\ntrue\n30\nlose weight\n"
    );

    cli_in(&temp_dir, &data_dir)
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Height: 170.5 cm"))
        .stdout(predicate::str::contains("Sex:    male"))
        .stdout(predicate::str::contains("Goal:   lose weight"));

    cli_in(&temp_dir, &data_dir)
        .args(["profile", "show", "--raw"])
        .assert()
        .success()
        .stdout(predicate::str::diff("170.5\n65.2\ntrue\n30\nlose weight\n"));
}

#[test]
fn test_reset_clears_catalog_and_log() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args(["meal", "add", "--name", "cake", "--calories", "400"])
        .assert()
        .success();
    cli_in(&temp_dir, &data_dir)
        .args(["log", "add", "--meal", "cake"])
        .assert()
        .success();

    cli_in(&temp_dir, &data_dir).arg("reset").assert().success();

    assert_eq!(fs::read_to_string(data_dir.join("meal_options.csv")).unwrap(), "");
    assert_eq!(fs::read_to_string(data_dir.join("meal_entries.csv")).unwrap(), "");
}

// dirs only honours XDG_CONFIG_HOME on Linux
#[cfg(target_os = "linux")]
#[test]
fn test_config_file_sets_data_dir() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("configured");
    let config_dir = temp_dir.path().join("config").join("healthmate");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("[data]\ndata_dir = {:?}\n", data_dir.to_str().unwrap()),
    )
    .unwrap();

    cli(&temp_dir)
        .args(["meal", "add", "--name", "tea", "--calories", "5"])
        .assert()
        .success();

    assert!(data_dir.join("meal_options.csv").exists());
}

#[test]
fn test_profile_set_requires_one_sex_flag() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    let base = ["profile", "set", "--height", "170", "--weight", "70", "--age", "30"];

    cli_in(&temp_dir, &data_dir)
        .args(base)
        .args(["--goal", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--male"));

    cli_in(&temp_dir, &data_dir)
        .args(base)
        .args(["--male", "--female", "--goal", "x"])
        .assert()
        .failure();

    assert!(!data_dir.join("user_data.txt").exists());
}

#[test]
fn test_meal_name_with_comma_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli_in(&temp_dir, &data_dir)
        .args(["meal", "add", "--name", "mac, cheese", "--calories", "550"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot contain commas"));

    cli_in(&temp_dir, &data_dir)
        .args(["log", "add", "--name", "a,b", "--calories", "10"])
        .assert()
        .failure();

    assert!(!data_dir.join("meal_options.csv").exists());
    assert!(!data_dir.join("meal_entries.csv").exists());
}

#[cfg(target_os = "linux")]
#[test]
fn test_malformed_config_does_not_break_help() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config").join("healthmate");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[data\ndata_dir = ").unwrap();

    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("meal"));

    cli(&temp_dir)
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("status")
        .assert()
        .failure();
}

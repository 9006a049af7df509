//! End-to-end tests that invoke the compiled `framectl` binary against a
//! temporary device layout.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use frame_drivers::settings::DEFAULT_MARKER;
use frame_test_utils::{TestSystem, write_manifest};
use predicates::prelude::*;

/// Get a Command for the framectl binary, configured for `system`
fn framectl(system: &TestSystem, settings: &Path) -> Command {
    let mut cmd = Command::cargo_bin("framectl").expect("Failed to find framectl binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("FRAME_DRIVERS_CONFIG")
        .env_remove("RUST_LOG")
        .current_dir(system.root())
        .arg("--config")
        .arg(settings);
    cmd
}

/// Settings pointing into `system`, with a stand-in `unzip` that copies an
/// unpacked package directory.
#[cfg(unix)]
fn settings(system: &TestSystem) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let unzip = system.root().join("fake-unzip");
    fs::write(&unzip, "#!/bin/sh\ncp -R \"$1\"/. \"$3\"\n").unwrap();
    fs::set_permissions(&unzip, fs::Permissions::from_mode(0o755)).unwrap();

    let path = system.root().join("settings.toml");
    fs::write(
        &path,
        format!(
            "{}unzip_program = {:?}\n",
            system.settings_toml(),
            unzip.display().to_string()
        ),
    )
    .unwrap();
    path
}

#[cfg(not(unix))]
fn settings(system: &TestSystem) -> PathBuf {
    system.write_settings()
}

fn tft_package(system: &TestSystem) -> PathBuf {
    let destination = system.dest_dir().join("tft35a.dtbo");
    write_manifest(
        &system.packages_dir(),
        "tft35a",
        &format!(
            "[Install]\noverlays/tft35a.dtbo={}\n[Config]\ndtoverlay=tft35a\n[Options]\nrotate=90\n",
            destination.display()
        ),
        &[("overlays/tft35a.dtbo", "dtbo")],
    );
    system.packages_dir().join("tft35a")
}

#[test]
fn test_help_mentions_commands() {
    Command::cargo_bin("framectl")
        .expect("Failed to find framectl binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("activate"))
        .stdout(predicate::str::contains("install"));
}

#[test]
fn test_list_empty() {
    let system = TestSystem::new();
    let settings = settings(&system);

    framectl(&system, &settings)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No drivers installed"));
}

#[test]
fn test_list_json_reports_origin() {
    let system = TestSystem::new();
    let settings = settings(&system);
    system.add_builtin_driver("hdmi", r#"{"version":2,"driver":"hdmi","install":[],"config":[]}"#, &[]);

    let output = framectl(&system, &settings)
        .args(["list", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["name"], "hdmi");
    assert_eq!(json[0]["origin"], "builtin");
}

#[test]
fn test_missing_config_file_fails() {
    let system = TestSystem::new();

    framectl(&system, &system.root().join("nope.toml"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_activate_unknown_driver_fails() {
    let system = TestSystem::new();
    let settings = settings(&system);
    system.write_boot_config("gpu_mem=128\n");

    framectl(&system, &settings)
        .args(["activate", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Driver not found: ghost"));

    assert_eq!(system.read_boot_config(), "gpu_mem=128\n");
}

#[test]
fn test_install_missing_package_fails() {
    let system = TestSystem::new();
    let settings = settings(&system);

    framectl(&system, &settings)
        .args(["install", "missing.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Package not found"));
}

#[test]
fn test_remove_builtin_refused() {
    let system = TestSystem::new();
    let settings = settings(&system);
    system.add_builtin_driver("hdmi", r#"{"version":2,"driver":"hdmi","install":[],"config":[]}"#, &[]);

    framectl(&system, &settings)
        .args(["remove", "hdmi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("built in"));
}

#[test]
#[cfg(unix)]
fn test_install_show_activate_deactivate() {
    let system = TestSystem::new();
    let settings = settings(&system);
    system.write_boot_config("gpu_mem=128\n");
    let package = tft_package(&system);

    framectl(&system, &settings)
        .arg("install")
        .arg(&package)
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed driver 'tft35a'"));

    framectl(&system, &settings)
        .args(["show", "tft35a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tft35a.dtbo"))
        .stdout(predicate::str::contains("dtoverlay=tft35a"));

    framectl(&system, &settings)
        .args(["activate", "tft35a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotate = 90"));
    assert_eq!(
        system.read_boot_config(),
        format!("gpu_mem=128\n{DEFAULT_MARKER}\ndtoverlay=tft35a\n")
    );
    assert_eq!(
        fs::read_to_string(system.dest_dir().join("tft35a.dtbo")).unwrap(),
        "dtbo"
    );

    framectl(&system, &settings)
        .arg("deactivate")
        .assert()
        .success();
    assert_eq!(system.read_boot_config(), "gpu_mem=128\n");

    framectl(&system, &settings)
        .args(["remove", "tft35a"])
        .assert()
        .success();
    assert!(!system.external_root().join("tft35a").exists());
}

#[test]
#[cfg(unix)]
fn test_activate_json_prints_options() {
    let system = TestSystem::new();
    let settings = settings(&system);
    let package = tft_package(&system);
    framectl(&system, &settings)
        .arg("install")
        .arg(&package)
        .assert()
        .success();

    let output = framectl(&system, &settings)
        .args(["activate", "tft35a", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"rotate": "90"}));
}

//! Integration tests for the `emodul` CLI binary.
//!
//! Argument parsing, configuration errors and exit codes, plus a few
//! end-to-end runs against a mocked backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `emodul` binary with env isolation.
///
/// Clears `EMODUL_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn emodul_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("emodul");
    cmd.env("HOME", "/tmp/emodul-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/emodul-cli-test-nonexistent")
        .env_remove("EMODUL_CONFIG")
        .env_remove("EMODUL_URL")
        .env_remove("EMODUL_USERNAME")
        .env_remove("EMODUL_PASSWORD")
        .env_remove("EMODUL_INSECURE")
        .env_remove("EMODUL_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Command wired to a mock backend with credentials and a short debounce.
fn emodul_against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = emodul_cmd();
    cmd.env("EMODUL_URL", server.uri())
        .env("EMODUL_USERNAME", "user@example.com")
        .env("EMODUL_PASSWORD", "hunter2")
        .env("EMODUL_DEVICE__DEBOUNCE_MS", "10");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "session=abc123; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/frontend/module_data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [{
                "id": 58,
                "params": { "widget1": { "value": 215 }, "widget2": { "value": 180 } }
            }]
        })))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = emodul_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    emodul_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("set"))
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("heat")),
    );
}

#[test]
fn test_version_flag() {
    emodul_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("emodul"));
}

#[test]
fn test_set_requires_number() {
    emodul_cmd()
        .args(["set", "warm"])
        .assert()
        .failure()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_status_without_credentials_is_auth_error() {
    let output = emodul_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("username"), "Expected 'username' in:\n{text}");
}

#[test]
fn test_missing_explicit_config_file() {
    emodul_cmd()
        .args(["--config", "/tmp/emodul-cli-test-nonexistent/none.toml", "status"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_masks_password() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("emodul.toml");
    std::fs::write(
        &file,
        "username = \"user@example.com\"\npassword = \"hunter2\"\n\n[device]\ntile_id = 12\n",
    )
    .unwrap();

    emodul_cmd()
        .arg("--config")
        .arg(&file)
        .arg("config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("user@example.com")
                .and(predicate::str::contains("tile_id = 12"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = mock_backend().await;

    let output = emodul_against(&server)
        .args(["status", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["target_temperature_c"], 21.5);
    assert_eq!(state["current_temperature_c"], 18.0);
    assert_eq!(state["mode"], "heat");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_writes_clamped_setpoint() {
    let server = mock_backend().await;
    Mock::given(method("POST"))
        .and(path("/send_control_data"))
        .and(body_json(json!([{ "ido": 139, "params": 300, "module_index": 0 }])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let output = emodul_against(&server).args(["set", "37"]).output().unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("target 30.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_tile_exit_code() {
    let server = mock_backend().await;

    let output = emodul_against(&server)
        .env("EMODUL_DEVICE__TILE_ID", "99")
        .arg("status")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

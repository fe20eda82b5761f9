//! Command-line surface tests.
//!
//! These run the built binary and check:
//! - Help and version output
//! - Completion script generation
//! - Argument validation for one-shot commands
//! - Error reporting when the service or config is unusable

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("pomodoro-client").unwrap();
    cmd.env_remove("POMODORO_BASE_URL")
        .env_remove("POMODORO_USERNAME")
        .env_remove("POMODORO_PASSWORD");
    cmd
}

// ============================================================================
// Help and Completions
// ============================================================================

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("completions"))
        .stdout(predicate::str::contains("--base-url"));
}

#[test]
fn version_is_printed() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bash_completions_are_generated() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pomodoro-client"));
}

// ============================================================================
// Argument Validation
// ============================================================================

#[test]
fn delete_rejects_non_numeric_id() {
    cmd()
        .args(["delete", "abc", "-u", "ada", "-p", "pw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'abc'"));
}

#[test]
fn history_requires_credentials() {
    cmd()
        .arg("history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--username"));
}

// ============================================================================
// Error Reporting
// ============================================================================

#[test]
fn unreachable_service_reports_login_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    cmd()
        .args(["history", "-u", "ada", "-p", "pw", "--base-url"])
        .arg(format!("http://{}", addr))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Failed to log in"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    cmd()
        .args(["history", "-u", "ada", "-p", "pw", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

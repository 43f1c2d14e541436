use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// `shamba` with an isolated config path and session file
fn shamba(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shamba").expect("binary should build");
    cmd.arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .env("SHAMBA_SESSION_BACKEND", "file")
        .env("SHAMBA_SESSION_FILE", dir.path().join("session.json"))
        .env("SHAMBA_LOGIN_DELAY_MS", "0")
        .env("SHAMBA_PREDICTION_ENDPOINT", "http://127.0.0.1:9/predict")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("shamba")
        .expect("binary should build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("login"));
}

#[test]
#[serial]
fn test_ask_requires_login() {
    let dir = TempDir::new().expect("failed to create tempdir");
    shamba(&dir)
        .args(["ask", "What pressure for tomatoes?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
#[serial]
fn test_login_then_ask_local_question() {
    let dir = TempDir::new().expect("failed to create tempdir");

    shamba(&dir)
        .args(["login", "--username", "farmer", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as farmer"));

    shamba(&dir)
        .args(["ask", "what", "pressure", "for", "TOMATOES?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2-3 bar"));

    shamba(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("logged in"));

    shamba(&dir).arg("logout").assert().success();

    shamba(&dir)
        .args(["ask", "What pressure for tomatoes?"])
        .assert()
        .failure();
}

#[test]
#[serial]
fn test_ask_unreachable_endpoint_fails() {
    let dir = TempDir::new().expect("failed to create tempdir");

    shamba(&dir)
        .args(["login", "-u", "farmer", "-p", "secret"])
        .assert()
        .success();

    shamba(&dir)
        .args(["ask", "How deep should drip lines be buried?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Remote unavailable"));
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    let dir = TempDir::new().expect("failed to create tempdir");
    shamba(&dir)
        .args(["--endpoint", "not a url", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prediction.endpoint"));
}

//! Tests for Codex process spawning and control.

use std::time::{Duration, Instant};

use codex_runner::cli::{
    exit_code_of, write_task, CodexProcess, DeliveryMode, SpawnError, Termination,
};
use tokio::io::AsyncReadExt;

use crate::support::FakeCodex;

#[tokio::test]
async fn spawn_missing_binary_is_not_found() {
    let err = CodexProcess::spawn("codex-runner-no-such-binary", &[], DeliveryMode::Inline)
        .unwrap_err();
    assert!(matches!(err, SpawnError::NotFound(ref name) if name == "codex-runner-no-such-binary"));
    assert_eq!(
        err.to_string(),
        "codex-runner-no-such-binary command not found in PATH"
    );
}

#[tokio::test]
async fn piped_stdin_reaches_child() {
    let mut process = CodexProcess::spawn("cat", &[], DeliveryMode::Piped).unwrap();
    let mut stdout = process.take_stdout().unwrap();

    let stdin = process.take_stdin().unwrap();
    write_task(stdin, "long task text").await.unwrap();

    let mut echoed = String::new();
    stdout.read_to_string(&mut echoed).await.unwrap();
    assert_eq!(echoed, "long task text");
    assert!(process.wait().await.unwrap().success());
}

#[tokio::test]
async fn inline_mode_has_no_stdin() {
    let mut process = CodexProcess::spawn("cat", &[], DeliveryMode::Inline).unwrap();
    assert!(process.take_stdin().is_none());

    // Stdin is /dev/null, so `cat` exits immediately.
    let status = process.wait().await.unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn take_stdout_once() {
    let mut process =
        CodexProcess::spawn("echo", &["hello".to_string()], DeliveryMode::Inline).unwrap();

    assert!(process.take_stdout().is_some());
    assert!(process.take_stdout().is_none());

    process.wait().await.unwrap();
}

#[tokio::test]
async fn graceful_terminate_stops_cooperative_child() {
    let fake = FakeCodex::new("exec sleep 30");
    let mut process = CodexProcess::spawn(&fake.binary(), &[], DeliveryMode::Inline).unwrap();

    let termination = process
        .graceful_terminate(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(termination, Termination::Graceful);
    assert!(process.is_terminated());
    assert!(process.try_wait().unwrap().is_some());
}

#[tokio::test]
async fn graceful_terminate_kills_after_grace_period() {
    let fake = FakeCodex::new("trap '' TERM\nwhile :; do sleep 1; done");
    let mut process = CodexProcess::spawn(&fake.binary(), &[], DeliveryMode::Inline).unwrap();
    // Let the shell install its trap.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    let termination = process
        .graceful_terminate(Duration::from_millis(500))
        .await
        .unwrap();

    assert_eq!(termination, Termination::Killed);
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn graceful_terminate_runs_once() {
    let fake = FakeCodex::new("exec sleep 30");
    let mut process = CodexProcess::spawn(&fake.binary(), &[], DeliveryMode::Inline).unwrap();

    process
        .graceful_terminate(Duration::from_secs(5))
        .await
        .unwrap();
    let again = process
        .graceful_terminate(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(again, Termination::AlreadyDone);
}

#[tokio::test]
async fn graceful_terminate_after_exit_is_noop() {
    let mut process = CodexProcess::spawn("true", &[], DeliveryMode::Inline).unwrap();
    process.wait().await.unwrap();

    let termination = process
        .graceful_terminate(Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(termination, Termination::AlreadyDone);
}

#[tokio::test]
async fn exit_code_of_reports_code_and_signal() {
    let failing_fake = FakeCodex::new("exit 3");
    let mut failing =
        CodexProcess::spawn(&failing_fake.binary(), &[], DeliveryMode::Inline).unwrap();
    assert_eq!(exit_code_of(failing.wait().await.unwrap()), 3);

    let killed_fake = FakeCodex::new("kill -9 $$");
    let mut killed =
        CodexProcess::spawn(&killed_fake.binary(), &[], DeliveryMode::Inline).unwrap();
    assert_eq!(exit_code_of(killed.wait().await.unwrap()), 137);
}

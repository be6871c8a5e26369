use super::*;
use std::time::Duration;

#[tokio::test]
async fn test_production_runner_success() {
    let runner = runner::TokioProcessRunner;
    let command = ProcessCommandBuilder::new("echo")
        .arg("hello world")
        .build();

    let output = runner.run(command).await.unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout.trim(), "hello world");
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn test_production_runner_failure() {
    let runner = runner::TokioProcessRunner;
    let command = ProcessCommandBuilder::new("false").build();

    let output = runner.run(command).await.unwrap();
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_production_runner_command_not_found() {
    let runner = runner::TokioProcessRunner;
    let command = ProcessCommandBuilder::new("nonexistent-command-12345").build();

    let result = runner.run(command).await;
    assert!(matches!(result, Err(ProcessError::CommandNotFound(_))));
}

#[tokio::test]
async fn test_production_runner_timeout() {
    let runner = runner::TokioProcessRunner;
    let command = ProcessCommandBuilder::new("sleep")
        .arg("5")
        .timeout(Duration::from_millis(100))
        .build();

    let result = runner.run(command).await;
    assert!(matches!(result, Err(ProcessError::Timeout(_))));
}

#[tokio::test]
async fn test_production_runner_env_override() {
    let runner = runner::TokioProcessRunner;
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo $ACCEPTANCE_PROBE"])
        .env("ACCEPTANCE_PROBE", "present")
        .build();

    let output = runner.run(command).await.unwrap();
    assert_eq!(output.stdout.trim(), "present");
}

#[test]
fn test_join_streams() {
    assert_eq!(join_streams("out\n", ""), "out");
    assert_eq!(join_streams("", "err\n"), "err");
    assert_eq!(join_streams("out\n", "err\n"), "out\nerr");
    assert_eq!(join_streams("  ", "\n"), "");
}

#[test]
fn test_command_display_quotes_arguments() {
    let command = ProcessCommandBuilder::new("juju")
        .args(["run", "--unit", "hive/0", "pgrep -a java"])
        .build();
    assert_eq!(command.display(), "juju run --unit hive/0 'pgrep -a java'");
}

#[tokio::test]
async fn test_mock_runner_basic() {
    let mut mock = MockProcessRunner::new();

    mock.expect_command("juju")
        .with_args(|args| args == ["version"])
        .returns_stdout("2.9.45-ubuntu-amd64\n")
        .returns_success()
        .finish();

    let output = mock
        .run(ProcessCommandBuilder::new("juju").arg("version").build())
        .await
        .unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, "2.9.45-ubuntu-amd64\n");
    assert!(mock.verify_called("juju", 1));
}

#[tokio::test]
async fn test_mock_runner_sequences_limited_expectations() {
    let mut mock = MockProcessRunner::new();

    mock.expect_command("juju")
        .returns_stdout("first")
        .times(1)
        .finish();
    mock.expect_command("juju").returns_stdout("second").finish();

    let command = ProcessCommandBuilder::new("juju").arg("status").build();
    let first = mock.run(command.clone()).await.unwrap();
    let second = mock.run(command.clone()).await.unwrap();
    let third = mock.run(command).await.unwrap();

    assert_eq!(first.stdout, "first");
    assert_eq!(second.stdout, "second");
    assert_eq!(third.stdout, "second");
}

#[tokio::test]
async fn test_mock_runner_exhausted_expectation() {
    let mut mock = MockProcessRunner::new();

    mock.expect_command("juju")
        .with_args(|args| args == ["deploy", "bundle.yaml"])
        .times(1)
        .finish();

    let command = ProcessCommandBuilder::new("juju")
        .args(["deploy", "bundle.yaml"])
        .build();
    assert!(mock.run(command.clone()).await.is_ok());

    let err = mock.run(command).await.unwrap_err();
    assert!(matches!(err, ProcessError::MockExpectationNotMet(_)));
    assert!(err.to_string().contains("more times than expected"));
}

#[tokio::test]
async fn test_mock_runner_not_found() {
    let mut mock = MockProcessRunner::new();
    mock.expect_command("juju").returns_not_found().finish();

    let result = mock
        .run(ProcessCommandBuilder::new("juju").arg("status").build())
        .await;
    assert!(matches!(result, Err(ProcessError::CommandNotFound(p)) if p == "juju"));
}

#[tokio::test]
async fn test_subprocess_manager_mock() {
    let (manager, mut mock) = SubprocessManager::mock();

    mock.expect_command("ls")
        .returns_stdout("bundle.yaml\n")
        .finish();

    let output = manager
        .runner()
        .run(ProcessCommandBuilder::new("ls").build())
        .await
        .unwrap();
    assert_eq!(output.stdout, "bundle.yaml\n");
    assert!(mock.verify_called("ls", 1));
}

#[test]
fn test_failed_error_carries_output() {
    let command = ProcessCommandBuilder::new("juju")
        .args(["deploy", "bundle.yaml"])
        .build();
    let output = ProcessOutput {
        status: ExitStatus::Error(2),
        stdout: String::new(),
        stderr: "ERROR cannot deploy bundle\n".to_string(),
        duration: Duration::from_millis(5),
    };

    let err = ProcessError::failed(&command, &output);
    let message = err.to_string();
    assert!(message.contains("juju deploy bundle.yaml"));
    assert!(message.contains("code 2"));
    assert!(message.contains("ERROR cannot deploy bundle"));
}

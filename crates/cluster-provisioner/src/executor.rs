//! External process execution.
//!
//! Every subprocess goes through [`CommandExecutor`] so the workflow can be
//! driven by a scripted fake in tests. The real implementation honours a
//! cancellation token and an optional per-command timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::CommandInvocation;
use crate::error::{ProvisionError, Result};

/// Captured outcome of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Runs external commands to completion.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command with inherited stdio so its output reaches the user directly.
    async fn execute(
        &self,
        invocation: &CommandInvocation,
        cancel: &CancellationToken,
    ) -> Result<()>;

    /// Run a command and capture stdout and stderr for parsing.
    async fn execute_capturing(
        &self,
        invocation: &CommandInvocation,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult>;
}

/// Executor backed by real OS processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any command still running after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(
        &self,
        invocation: &CommandInvocation,
        capture: bool,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult> {
        let command_line = invocation.to_string();
        debug!(command = %command_line, capture, "Running command");

        let mut command = Command::new(invocation.program());
        command
            .args(invocation.get_args())
            .envs(invocation.get_envs().iter().map(|(k, v)| (k, v)))
            .kill_on_drop(true);

        if capture {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        } else {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        }

        let child = command.spawn().map_err(|source| ProvisionError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let deadline = async {
            match self.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        // Dropping the wait future kills the child via kill_on_drop.
        let output = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!(command = %command_line, "Command cancelled");
                return Err(ProvisionError::Cancelled { command: command_line });
            }
            () = deadline => {
                let secs = self.timeout.map_or(0, |t| t.as_secs());
                warn!(command = %command_line, secs, "Command timed out");
                return Err(ProvisionError::TimedOut { command: command_line, secs });
            }
            output = child.wait_with_output() => output.map_err(|source| ProvisionError::Spawn {
                command: command_line.clone(),
                source,
            })?,
        };

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        if !output.status.success() {
            return Err(ProvisionError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: result.stderr.trim().to_string(),
            });
        }

        debug!(
            command = %command_line,
            stdout_bytes = result.stdout.len(),
            "Command finished"
        );
        Ok(result)
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        invocation: &CommandInvocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.run(invocation, false, cancel).await.map(|_| ())
    }

    async fn execute_capturing(
        &self,
        invocation: &CommandInvocation,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult> {
        self.run(invocation, true, cancel).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandInvocation {
        CommandInvocation::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let executor = ProcessExecutor::new();
        let result = executor
            .execute_capturing(&sh("echo hello"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_env_overrides_reach_child() {
        let executor = ProcessExecutor::new();
        let invocation = sh("printf %s \"$KUBECONFIG\"").env("KUBECONFIG", "/tmp/config");
        let result = executor
            .execute_capturing(&invocation, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.stdout, "/tmp/config");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let executor = ProcessExecutor::new();
        let err = executor
            .execute_capturing(&sh("echo boom >&2; exit 3"), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ProvisionError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let executor = ProcessExecutor::new();
        let err = executor
            .execute(
                &CommandInvocation::new("definitely-not-a-real-binary-7f3a"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_stops_command() {
        let executor = ProcessExecutor::new();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = executor
            .execute_capturing(&sh("sleep 30"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_timeout_stops_command() {
        let executor = ProcessExecutor::new().with_timeout(Some(Duration::from_millis(50)));
        let err = executor
            .execute_capturing(&sh("sleep 30"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::TimedOut { .. }));
    }
}

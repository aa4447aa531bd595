//! Scripted command executor for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::command::CommandInvocation;
use crate::error::{ProvisionError, Result};
use crate::executor::{CommandExecutor, ExecutionResult};

/// Canned response for a command.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Output(String),
    Fail(String),
}

impl Scripted {
    pub(crate) fn output(stdout: &str) -> Self {
        Self::Output(stdout.to_string())
    }

    pub(crate) fn fail(stderr: &str) -> Self {
        Self::Fail(stderr.to_string())
    }
}

/// Records every invocation and answers from a prefix-matched script.
///
/// Commands with no matching rule succeed with empty output.
#[derive(Default)]
pub(crate) struct ScriptedExecutor {
    rules: Vec<(String, Scripted)>,
    calls: Mutex<Vec<CommandInvocation>>,
}

impl ScriptedExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer any command line starting with `prefix`.
    pub(crate) fn on(mut self, prefix: &str, response: Scripted) -> Self {
        self.rules.push((prefix.to_string(), response));
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    fn respond(&self, invocation: &CommandInvocation) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(invocation.clone());

        let line = invocation.to_string();
        let rule = self
            .rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()));

        match rule.map(|(_, response)| response) {
            Some(Scripted::Fail(stderr)) => Err(ProvisionError::CommandFailed {
                command: line,
                status: "exit status: 1".into(),
                stderr: stderr.clone(),
            }),
            Some(Scripted::Output(stdout)) => Ok(ExecutionResult {
                stdout: stdout.clone(),
                stderr: String::new(),
                exit_code: Some(0),
            }),
            None => Ok(ExecutionResult {
                exit_code: Some(0),
                ..ExecutionResult::default()
            }),
        }
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        invocation: &CommandInvocation,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled {
                command: invocation.to_string(),
            });
        }
        self.respond(invocation).map(|_| ())
    }

    async fn execute_capturing(
        &self,
        invocation: &CommandInvocation,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult> {
        if cancel.is_cancelled() {
            return Err(ProvisionError::Cancelled {
                command: invocation.to_string(),
            });
        }
        self.respond(invocation)
    }
}

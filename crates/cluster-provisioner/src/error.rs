//! Error types for cluster provisioning.

use thiserror::Error;

/// Errors that can occur while provisioning a cluster.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A supplied flag failed validation.
    #[error("{0}")]
    Validation(String),

    /// The interactive selection prompt failed.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// The external command could not be started.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external command exited unsuccessfully.
    #[error("Command '{command}' failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The external command was cancelled before it finished.
    #[error("Command '{command}' was cancelled")]
    Cancelled { command: String },

    /// The external command ran past its deadline.
    #[error("Command '{command}' timed out after {secs} seconds")]
    TimedOut { command: String, secs: u64 },

    /// An expected value was absent from command output.
    #[error("Could not find {what} in the output of '{command}'")]
    MissingOutput { what: String, command: String },

    /// A step ran before the step it depends on.
    #[error("Provisioning state is inconsistent: {0}")]
    State(String),

    /// Settings could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProvisionError>;

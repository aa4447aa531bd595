//! IBM Cloud Cluster Provisioner Library.
//!
//! This library creates a managed Kubernetes cluster with the IBM Cloud
//! `bx` CLI, hands the new cluster to the platform installer, and points the
//! local kubectl context at the installed namespace.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use cluster_provisioner::{ClusterFlags, ClusterProvisioner, ProcessExecutor, ProvisionerSettings};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = ProvisionerSettings::default();
//!     let executor = Arc::new(ProcessExecutor::new());
//!     let mut provisioner = ClusterProvisioner::new(settings, ClusterFlags::default(), executor);
//!     provisioner.run(&CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod catalog;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod extract;
pub mod installer;
pub mod names;
pub mod orchestrator;
pub mod prerequisites;
pub mod resolver;
pub mod state;
pub mod ui;

#[cfg(test)]
mod testing;

// Re-export commonly used types at the crate root
pub use command::CommandInvocation;
pub use config::{ClusterFlags, HardwareIsolation, ProvisionRequest, ProvisionerSettings};
pub use error::{ProvisionError, Result};
pub use executor::{CommandExecutor, ExecutionResult, ProcessExecutor};
pub use orchestrator::ClusterProvisioner;
pub use state::{ProvisionState, ProvisionStep};

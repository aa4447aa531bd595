//! Cluster provisioning CLI.
//!
//! Creates a managed Kubernetes cluster on IBM Cloud, installs the platform
//! onto it and points the local kubectl context at the new namespace.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::bx::CreateClusterBxCommand;

/// Create a new Kubernetes cluster.
#[derive(Parser)]
#[command(
    name = "create-cluster",
    version,
    about = "Create a new Kubernetes cluster and install the platform",
    long_about = "Create a new Kubernetes cluster and install the platform.\n\n\
                  The cluster is created with the provider CLI, the platform\n\
                  installer is run against it, and the current kubectl context\n\
                  is switched to the platform namespace.\n\n\
                  Nothing is rolled back on failure; the failure report lists\n\
                  what was created and how to remove it."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new Kubernetes cluster on IBM Cloud.
    ///
    /// Logs in with single sign-on unless --skip-login is given. Missing
    /// or invalid location and machine type values are picked interactively.
    Bx(CreateClusterBxCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("info,cluster_provisioner=debug,create_cluster=debug")
    } else {
        EnvFilter::new("warn,cluster_provisioner=info,create_cluster=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping the running command");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Bx(cmd) => cmd.run(&cancel).await,
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use cluster_provisioner::prerequisites::PrerequisitesValidator;
use cluster_provisioner::{
    ClusterFlags, ClusterProvisioner, HardwareIsolation, ProcessExecutor, ProvisionerSettings,
};

/// Create a new Kubernetes cluster on IBM Cloud
#[derive(Args, Debug)]
pub struct CreateClusterBxCommand {
    /// Name of the cluster; a random one is generated when omitted
    #[arg(short = 'n', long, value_name = "NAME", default_value = "")]
    cluster_name: String,

    /// Skip logging in to IBM Cloud
    #[arg(long)]
    skip_login: bool,

    /// Kubernetes version for the cluster master
    #[arg(long, value_name = "VERSION", default_value = "")]
    kube_version: String,

    /// Location (zone) to create the cluster in
    #[arg(long, value_name = "LOCATION", default_value = "")]
    location: String,

    /// Public VLAN id
    #[arg(long, value_name = "ID", default_value = "")]
    public_vlan: String,

    /// Private VLAN id
    #[arg(long, value_name = "ID", default_value = "")]
    private_vlan: String,

    /// Number of worker nodes
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    workers: i64,

    /// Machine type for the worker nodes
    #[arg(short, long, value_name = "TYPE", default_value = "")]
    machine_type: String,

    /// Hardware isolation level for the worker nodes
    #[arg(long, value_enum)]
    hardware: Option<HardwareIsolation>,

    /// Do not create a portable subnet for the cluster
    #[arg(long)]
    no_subnet: bool,

    /// Disable encryption on the worker node disks
    #[arg(long = "disable-disk-encrypt")]
    disable_disk_encryption: bool,

    /// Enable trusted cluster feature
    #[arg(long)]
    trusted: bool,

    /// Namespace to install the platform into
    #[arg(long, env = "CLUSTER_NAMESPACE")]
    namespace: Option<String>,

    /// Never prompt; fail on invalid values instead
    #[arg(short, long)]
    batch_mode: bool,

    /// Settings file (defaults to ~/.config/cluster-provisioner/config.yaml)
    #[arg(long, value_name = "FILE", env = "PROVISIONER_CONFIG")]
    config: Option<PathBuf>,

    /// IBM Cloud CLI executable
    #[arg(long, value_name = "PATH", env = "BX_BINARY")]
    provider_binary: Option<String>,

    /// kubectl executable
    #[arg(long, value_name = "PATH", env = "KUBECTL_BINARY")]
    kubectl_binary: Option<String>,

    /// Platform installer executable
    #[arg(long, value_name = "PATH", env = "JX_BINARY")]
    installer_binary: Option<String>,

    /// Kill any external command that runs longer than this
    #[arg(long, value_name = "SECS")]
    command_timeout: Option<u64>,

    /// Do not check that the required tools are installed
    #[arg(long)]
    skip_prerequisites: bool,
}

impl CreateClusterBxCommand {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<()> {
        let base = ProvisionerSettings::load_or_default(self.config.as_deref())
            .context("Failed to load provisioner settings")?;
        let settings = self.apply_overrides(base);
        debug!(?settings, "Resolved provisioner settings");

        if !self.skip_prerequisites {
            PrerequisitesValidator::new(&settings).validate()?;
        }

        let executor = Arc::new(ProcessExecutor::new().with_timeout(settings.command_timeout()));
        let mut provisioner = ClusterProvisioner::new(settings, self.flags(), executor);
        provisioner.run(cancel).await?;
        Ok(())
    }

    fn flags(&self) -> ClusterFlags {
        ClusterFlags {
            cluster_name: self.cluster_name.clone(),
            skip_login: self.skip_login,
            kube_version: self.kube_version.clone(),
            location: self.location.clone(),
            public_vlan: self.public_vlan.clone(),
            private_vlan: self.private_vlan.clone(),
            workers: self.workers,
            machine_type: self.machine_type.clone(),
            hardware: self.hardware,
            no_subnet: self.no_subnet,
            disable_disk_encryption: self.disable_disk_encryption,
            trusted: self.trusted,
        }
    }

    /// Command-line values win over the settings file.
    fn apply_overrides(&self, mut settings: ProvisionerSettings) -> ProvisionerSettings {
        if let Some(binary) = &self.provider_binary {
            settings.provider_binary.clone_from(binary);
        }
        if let Some(binary) = &self.kubectl_binary {
            settings.kubectl_binary.clone_from(binary);
        }
        if let Some(binary) = &self.installer_binary {
            settings.installer_binary.clone_from(binary);
        }
        if let Some(namespace) = self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            settings.namespace = Some(namespace.to_string());
        }
        // An empty namespace means "not set" everywhere downstream.
        settings.namespace = settings.namespace.filter(|ns| !ns.is_empty());
        if self.batch_mode {
            settings.batch_mode = true;
        }
        if self.command_timeout.is_some() {
            settings.command_timeout_secs = self.command_timeout;
        }
        settings
    }
}

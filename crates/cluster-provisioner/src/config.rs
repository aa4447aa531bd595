//! Provisioning configuration types.
//!
//! This module defines the raw cluster flags supplied by the user, the
//! resolved request handed to the command builder, and the tool settings
//! shared by every step.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ProvisionError, Result};

/// Level of hardware isolation for worker nodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HardwareIsolation {
    /// Physical resources dedicated to a single account.
    Dedicated,
    /// Physical resources shared with other IBM customers.
    Shared,
}

impl std::fmt::Display for HardwareIsolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dedicated => write!(f, "dedicated"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

impl std::str::FromStr for HardwareIsolation {
    type Err = ProvisionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dedicated" => Ok(Self::Dedicated),
            "shared" => Ok(Self::Shared),
            _ => Err(ProvisionError::Validation(format!(
                "Unknown hardware isolation level: {s}. Supported: dedicated, shared"
            ))),
        }
    }
}

/// Cluster flags exactly as the user supplied them.
///
/// Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterFlags {
    pub cluster_name: String,
    pub skip_login: bool,
    pub kube_version: String,
    pub location: String,
    pub public_vlan: String,
    pub private_vlan: String,
    pub workers: i64,
    pub machine_type: String,
    pub hardware: Option<HardwareIsolation>,
    pub no_subnet: bool,
    pub disable_disk_encryption: bool,
    pub trusted: bool,
}

impl Default for ClusterFlags {
    fn default() -> Self {
        Self {
            cluster_name: String::new(),
            skip_login: false,
            kube_version: String::new(),
            location: String::new(),
            public_vlan: String::new(),
            private_vlan: String::new(),
            workers: 1,
            machine_type: String::new(),
            hardware: None,
            no_subnet: false,
            disable_disk_encryption: false,
            trusted: false,
        }
    }
}

impl ClusterFlags {
    /// Check the flags that can be rejected without any user interaction.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the worker count is below one.
    pub fn validate(&self) -> Result<u32> {
        if self.workers <= 0 {
            return Err(ProvisionError::Validation(format!(
                "Invalid number of worker nodes ({} should be >= 1)",
                self.workers
            )));
        }
        u32::try_from(self.workers).map_err(|_| {
            ProvisionError::Validation(format!(
                "Invalid number of worker nodes ({} is too large)",
                self.workers
            ))
        })
    }
}

/// A fully resolved cluster creation request.
///
/// Every optional catalog value has been validated or picked interactively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub cluster_name: String,
    pub kube_version: Option<String>,
    pub location: Option<String>,
    pub public_vlan: Option<String>,
    pub private_vlan: Option<String>,
    pub workers: u32,
    pub machine_type: Option<String>,
    pub hardware: Option<HardwareIsolation>,
    pub no_subnet: bool,
    pub disable_disk_encryption: bool,
    pub trusted: bool,
}

impl ProvisionRequest {
    /// Create a request with only the mandatory cluster name set.
    #[must_use]
    pub fn named(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            kube_version: None,
            location: None,
            public_vlan: None,
            private_vlan: None,
            workers: 1,
            machine_type: None,
            hardware: None,
            no_subnet: false,
            disable_disk_encryption: false,
            trusted: false,
        }
    }
}

/// Tool settings shared by every provisioning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionerSettings {
    /// IBM Cloud CLI executable.
    pub provider_binary: String,
    /// kubectl executable.
    pub kubectl_binary: String,
    /// Platform installer executable.
    pub installer_binary: String,
    /// Namespace the platform is installed into and the context is switched to.
    pub namespace: Option<String>,
    /// Never prompt; invalid values become errors instead.
    pub batch_mode: bool,
    /// Per-command timeout in seconds. No timeout when unset.
    pub command_timeout_secs: Option<u64>,
}

impl Default for ProvisionerSettings {
    fn default() -> Self {
        Self {
            provider_binary: "bx".into(),
            kubectl_binary: "kubectl".into(),
            installer_binary: "jx".into(),
            namespace: None,
            batch_mode: false,
            command_timeout_secs: None,
        }
    }
}

impl ProvisionerSettings {
    /// Default settings file location (`~/.config/cluster-provisioner/config.yaml`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cluster-provisioner").join("config.yaml"))
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let settings: Self = serde_yaml::from_str(&content).map_err(|e| {
            ProvisionError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        info!(path = %path.display(), "Loaded provisioner settings");
        Ok(settings)
    }

    /// Load settings from `path`, or from the default location if it exists.
    ///
    /// Falls back to built-in defaults when no file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path is missing or any file is malformed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Per-command timeout as a duration.
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

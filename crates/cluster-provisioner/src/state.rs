//! Provisioning progress tracking.
//!
//! Cluster creation cannot be rolled back, so the state records every
//! irreversible side effect that completed. On failure it tells the operator
//! what was left behind and how to clean it up.

use std::path::PathBuf;

use tracing::info;

/// Provisioning steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ProvisionStep {
    /// Not yet started.
    #[default]
    NotStarted,
    /// Logging in to IBM Cloud.
    LoggingIn,
    /// Resolving and validating cluster flags.
    ResolvingFlags,
    /// Creating the cluster with the provider CLI.
    CreatingCluster,
    /// Installing the platform onto the cluster.
    InstallingPlatform,
    /// Fetching the cluster kubeconfig location.
    FetchingClusterConfig,
    /// Pointing the kubectl context at the platform namespace.
    ReconcilingContext,
    /// Provisioning complete.
    Complete,
}

impl ProvisionStep {
    /// Get the next step in the sequence.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::NotStarted => Self::LoggingIn,
            Self::LoggingIn => Self::ResolvingFlags,
            Self::ResolvingFlags => Self::CreatingCluster,
            Self::CreatingCluster => Self::InstallingPlatform,
            Self::InstallingPlatform => Self::FetchingClusterConfig,
            Self::FetchingClusterConfig => Self::ReconcilingContext,
            Self::ReconcilingContext | Self::Complete => Self::Complete,
        }
    }

    /// Get a human-readable description of the step.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::LoggingIn => "Logging in to IBM Cloud",
            Self::ResolvingFlags => "Resolving cluster settings",
            Self::CreatingCluster => "Creating Kubernetes cluster",
            Self::InstallingPlatform => "Installing platform",
            Self::FetchingClusterConfig => "Fetching cluster configuration",
            Self::ReconcilingContext => "Configuring kubectl context",
            Self::Complete => "Complete",
        }
    }

    /// Get the step number for progress display.
    #[must_use]
    pub fn step_number(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::LoggingIn => 1,
            Self::ResolvingFlags => 2,
            Self::CreatingCluster => 3,
            Self::InstallingPlatform => 4,
            Self::FetchingClusterConfig => 5,
            Self::ReconcilingContext | Self::Complete => 6,
        }
    }

    /// Total number of steps.
    pub const TOTAL_STEPS: u8 = 6;
}

impl std::fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Progress of a single provisioning run.
#[derive(Debug, Clone, Default)]
pub struct ProvisionState {
    /// Current step.
    pub step: ProvisionStep,
    /// Resolved cluster name (once flags are resolved).
    pub cluster_name: Option<String>,
    /// Whether the provider login succeeded.
    pub logged_in: bool,
    /// Whether the provider created the cluster.
    pub cluster_created: bool,
    /// Whether the platform installer finished.
    pub platform_installed: bool,
    /// Kubeconfig location reported by the provider.
    pub kubeconfig_path: Option<PathBuf>,
    /// Context whose namespace was rewritten, with that namespace.
    pub context: Option<(String, String)>,
    /// Last error message (if any).
    pub last_error: Option<String>,
}

impl ProvisionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next step.
    pub fn advance(&mut self) {
        let next = self.step.next();
        info!("Step: {} -> {}", self.step, next);
        self.step = next;
    }

    /// Record an error for the current step.
    pub fn record_error(&mut self, error: &str) {
        self.last_error = Some(error.to_string());
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.step == ProvisionStep::Complete
    }

    /// Irreversible side effects that completed, in order.
    #[must_use]
    pub fn completed_side_effects(&self) -> Vec<String> {
        let mut effects = Vec::new();

        if self.logged_in {
            effects.push("Logged in to IBM Cloud".to_string());
        }
        if self.cluster_created {
            let name = self.cluster_name.as_deref().unwrap_or("<unknown>");
            effects.push(format!("Created cluster '{name}'"));
        }
        if self.platform_installed {
            effects.push("Installed the platform onto the cluster".to_string());
        }
        if let Some(path) = &self.kubeconfig_path {
            effects.push(format!("Resolved kubeconfig {}", path.display()));
        }
        if let Some((context, namespace)) = &self.context {
            effects.push(format!(
                "Set namespace of context '{context}' to '{namespace}'"
            ));
        }

        effects
    }

    /// Commands an operator can run to undo what was created.
    #[must_use]
    pub fn cleanup_hints(&self, provider_binary: &str) -> Vec<String> {
        let mut hints = Vec::new();

        if self.cluster_created {
            if let Some(name) = &self.cluster_name {
                hints.push(format!("{provider_binary} cs cluster-rm {name}"));
            }
        }

        hints
    }
}

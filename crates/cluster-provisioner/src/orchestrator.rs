//! Provisioning orchestrator.
//!
//! Drives the workflow step by step: login, flag resolution, cluster
//! creation, platform installation, kubeconfig lookup and context
//! reconciliation. Any failure stops the run immediately.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::command::{self, KUBECONFIG_ENV};
use crate::config::{ClusterFlags, ProvisionRequest, ProvisionerSettings};
use crate::context::ContextReconciler;
use crate::error::{ProvisionError, Result};
use crate::executor::CommandExecutor;
use crate::extract::extract_assignment;
use crate::installer::{InstallOptions, JxInstaller, PlatformInstaller, PROVIDER_BX};
use crate::names::{NameGenerator, SillyNameGenerator};
use crate::resolver::{DialoguerPrompter, FlagResolver, Prompter};
use crate::state::{ProvisionState, ProvisionStep};
use crate::ui;

/// Creates an IBM Cloud cluster and installs the platform onto it.
pub struct ClusterProvisioner {
    settings: ProvisionerSettings,
    flags: ClusterFlags,
    executor: Arc<dyn CommandExecutor>,
    prompter: Box<dyn Prompter>,
    installer: Box<dyn PlatformInstaller>,
    names: Box<dyn NameGenerator>,
    state: ProvisionState,
    request: Option<ProvisionRequest>,
}

impl ClusterProvisioner {
    /// Create a provisioner with the terminal prompter and `jx` installer.
    #[must_use]
    pub fn new(
        settings: ProvisionerSettings,
        flags: ClusterFlags,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        let installer =
            JxInstaller::new(settings.installer_binary.clone(), Arc::clone(&executor));

        Self {
            settings,
            flags,
            executor,
            prompter: Box::new(DialoguerPrompter),
            installer: Box::new(installer),
            names: Box::new(SillyNameGenerator),
            state: ProvisionState::new(),
            request: None,
        }
    }

    #[must_use]
    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    #[must_use]
    pub fn with_installer(mut self, installer: impl PlatformInstaller + 'static) -> Self {
        self.installer = Box::new(installer);
        self
    }

    #[must_use]
    pub fn with_name_generator(mut self, names: impl NameGenerator + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    /// Progress of the current run.
    #[must_use]
    pub fn state(&self) -> &ProvisionState {
        &self.state
    }

    /// The resolved request, once flag resolution has run.
    #[must_use]
    pub fn request(&self) -> Option<&ProvisionRequest> {
        self.request.as_ref()
    }

    /// Run the whole workflow.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Nothing that already happened is undone;
    /// the failure report lists what was left behind.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<()> {
        // Rejected before anything touches the network.
        self.flags.validate()?;

        ui::print_section("Creating IBM Cloud Kubernetes Cluster");

        loop {
            self.state.advance();
            if self.state.is_complete() {
                self.print_summary();
                return Ok(());
            }

            let step = self.state.step;
            ui::print_progress_step(
                step.step_number(),
                ProvisionStep::TOTAL_STEPS,
                step.description(),
            );
            info!(step = ?step, "Executing step");

            if let Err(e) = self.execute_step(step, cancel).await {
                self.report_failure(&e);
                return Err(e);
            }
        }
    }

    async fn execute_step(
        &mut self,
        step: ProvisionStep,
        cancel: &CancellationToken,
    ) -> Result<()> {
        match step {
            ProvisionStep::NotStarted | ProvisionStep::Complete => Ok(()),
            ProvisionStep::LoggingIn => self.login(cancel).await,
            ProvisionStep::ResolvingFlags => self.resolve_flags(),
            ProvisionStep::CreatingCluster => self.create_cluster(cancel).await,
            ProvisionStep::InstallingPlatform => self.install_platform(cancel).await,
            ProvisionStep::FetchingClusterConfig => self.fetch_cluster_config(cancel).await,
            ProvisionStep::ReconcilingContext => self.reconcile_context(cancel).await,
        }
    }

    async fn login(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.flags.skip_login {
            ui::print_info("Skipping login");
            return Ok(());
        }

        self.executor
            .execute(&command::login_command(&self.settings.provider_binary), cancel)
            .await?;
        self.state.logged_in = true;
        ui::print_success("Logged in to IBM Cloud");
        Ok(())
    }

    fn resolve_flags(&mut self) -> Result<()> {
        let request = FlagResolver::new(self.prompter.as_ref(), self.names.as_ref())
            .batch_mode(self.settings.batch_mode)
            .resolve(&self.flags)?;

        self.state.cluster_name = Some(request.cluster_name.clone());
        self.request = Some(request);
        Ok(())
    }

    async fn create_cluster(&mut self, cancel: &CancellationToken) -> Result<()> {
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| ProvisionError::State("cluster flags were not resolved".into()))?;
        let invocation = command::build_create_command(&self.settings.provider_binary, request);

        info!(command = %invocation, "Creating cluster");
        ui::print_info(&format!("Let's create a cluster: {invocation}"));
        self.executor.execute(&invocation, cancel).await?;

        self.state.cluster_created = true;
        ui::print_success(&format!("Cluster '{}' created", request.cluster_name));
        Ok(())
    }

    async fn install_platform(&mut self, cancel: &CancellationToken) -> Result<()> {
        let options = InstallOptions {
            provider: PROVIDER_BX.to_string(),
            default_environment_prefix: self.cluster_name()?.to_string(),
            namespace: self.settings.namespace.clone(),
            batch_mode: self.settings.batch_mode,
        };

        self.installer.install(&options, cancel).await?;
        self.state.platform_installed = true;
        ui::print_success("Platform installed");
        Ok(())
    }

    async fn fetch_cluster_config(&mut self, cancel: &CancellationToken) -> Result<()> {
        let invocation =
            command::cluster_config_command(&self.settings.provider_binary, self.cluster_name()?);
        let output = self.executor.execute_capturing(&invocation, cancel).await?;

        // An empty KUBECONFIG makes kubectl fall back to ~/.kube/config.
        let assignment = extract_assignment(&output.stdout, KUBECONFIG_ENV)
            .filter(|assignment| !assignment.value.is_empty())
            .ok_or_else(|| ProvisionError::MissingOutput {
                what: format!("{KUBECONFIG_ENV}=<path>"),
                command: invocation.to_string(),
            })?;

        info!(key = %assignment.key, value = %assignment.value, "Resolved cluster kubeconfig");
        self.state.kubeconfig_path = Some(PathBuf::from(assignment.value));
        Ok(())
    }

    async fn reconcile_context(&mut self, cancel: &CancellationToken) -> Result<()> {
        let kubeconfig = self
            .state
            .kubeconfig_path
            .clone()
            .ok_or_else(|| ProvisionError::State("kubeconfig was not resolved".into()))?;

        let reconciled = ContextReconciler::new(
            self.executor.as_ref(),
            &self.settings.kubectl_binary,
            &kubeconfig,
        )
        .reconcile(self.settings.namespace.as_deref(), cancel)
        .await?;

        ui::print_success(&format!(
            "Context '{}' now uses namespace '{}'",
            reconciled.context, reconciled.namespace
        ));
        self.state.context = Some((reconciled.context, reconciled.namespace));
        Ok(())
    }

    fn cluster_name(&self) -> Result<&str> {
        self.state
            .cluster_name
            .as_deref()
            .ok_or_else(|| ProvisionError::State("cluster name was not resolved".into()))
    }

    fn report_failure(&mut self, e: &ProvisionError) {
        let step = self.state.step;
        self.state.record_error(&e.to_string());
        error!(step = ?step, error = %e, "Provisioning failed");
        ui::print_error(&format!(
            "Provisioning failed while {}: {e}",
            step.description().to_lowercase()
        ));

        let effects = self.state.completed_side_effects();
        if !effects.is_empty() {
            warn!(?effects, "Steps completed before the failure were not rolled back");
            println!();
            ui::print_warning("These changes were already made and have not been undone:");
            for effect in &effects {
                ui::print_list_item(effect);
            }
        }

        let hints = self.state.cleanup_hints(&self.settings.provider_binary);
        if !hints.is_empty() {
            println!();
            ui::print_info("To remove them run:");
            for hint in &hints {
                ui::print_list_item(hint);
            }
        }
    }

    fn print_summary(&self) {
        ui::print_section("Cluster Ready");

        if let Some(name) = &self.state.cluster_name {
            ui::print_kv("Cluster", name);
        }
        if let Some(path) = &self.state.kubeconfig_path {
            ui::print_kv("Kubeconfig", &path.display().to_string());
        }
        if let Some((context, namespace)) = &self.state.context {
            ui::print_kv("Context", context);
            ui::print_kv("Namespace", namespace);
        }

        if let Some(path) = &self.state.kubeconfig_path {
            println!();
            ui::print_info(&format!(
                "To use the cluster from your shell: export {KUBECONFIG_ENV}={}",
                path.display()
            ));
        }
        info!(cluster = ?self.state.cluster_name, "Provisioning complete");
    }
}

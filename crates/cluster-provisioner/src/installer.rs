//! Platform installer hand-off.
//!
//! Once the cluster exists the platform installer takes over. It is consumed
//! as a single call so the provisioning workflow stays independent of how
//! the platform itself is installed.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::command::CommandInvocation;
use crate::error::Result;
use crate::executor::CommandExecutor;

/// Provider name passed to the installer for IBM Cloud clusters.
pub const PROVIDER_BX: &str = "bx";

/// Options forwarded to the platform installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Kubernetes provider the cluster was created on.
    pub provider: String,
    /// Prefix for the environments the installer creates (the cluster name).
    pub default_environment_prefix: String,
    /// Namespace to install into; the installer default when unset.
    pub namespace: Option<String>,
    /// Run the installer without prompting.
    pub batch_mode: bool,
}

/// Installs the platform onto a freshly created cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlatformInstaller: Send + Sync {
    /// Run the installation to completion.
    async fn install(&self, options: &InstallOptions, cancel: &CancellationToken) -> Result<()>;
}

/// Installer that shells out to `jx install`.
pub struct JxInstaller {
    binary: String,
    executor: Arc<dyn CommandExecutor>,
}

impl JxInstaller {
    #[must_use]
    pub fn new(binary: impl Into<String>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    /// Build the `install` invocation for `options`.
    #[must_use]
    pub fn command(&self, options: &InstallOptions) -> CommandInvocation {
        let mut cmd = CommandInvocation::new(&self.binary).args([
            "install",
            "--provider",
            options.provider.as_str(),
            "--default-environment-prefix",
            options.default_environment_prefix.as_str(),
        ]);

        if let Some(namespace) = &options.namespace {
            cmd = cmd.args(["--namespace", namespace.as_str()]);
        }
        if options.batch_mode {
            cmd = cmd.arg("--batch-mode");
        }
        cmd
    }
}

#[async_trait]
impl PlatformInstaller for JxInstaller {
    async fn install(&self, options: &InstallOptions, cancel: &CancellationToken) -> Result<()> {
        info!(
            provider = %options.provider,
            prefix = %options.default_environment_prefix,
            "Installing platform"
        );
        self.executor.execute(&self.command(options), cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedExecutor};

    fn options() -> InstallOptions {
        InstallOptions {
            provider: PROVIDER_BX.into(),
            default_environment_prefix: "tallfrog".into(),
            namespace: None,
            batch_mode: false,
        }
    }

    #[tokio::test]
    async fn test_install_invocation() {
        let executor = Arc::new(ScriptedExecutor::new());
        let installer = JxInstaller::new("jx", executor.clone());

        installer
            .install(&options(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            executor.command_lines(),
            vec!["jx install --provider bx --default-environment-prefix tallfrog"]
        );
    }

    #[test]
    fn test_namespace_and_batch_mode_flags() {
        let installer = JxInstaller::new("jx", Arc::new(ScriptedExecutor::new()));
        let opts = InstallOptions {
            namespace: Some("jx".into()),
            batch_mode: true,
            ..options()
        };

        assert_eq!(
            installer.command(&opts).to_string(),
            "jx install --provider bx --default-environment-prefix tallfrog --namespace jx --batch-mode"
        );
    }

    #[tokio::test]
    async fn test_install_failure_propagates() {
        let executor =
            Arc::new(ScriptedExecutor::new().on("jx install", Scripted::fail("helm missing")));
        let installer = JxInstaller::new("jx", executor);

        let err = installer
            .install(&options(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("helm missing"));
    }
}

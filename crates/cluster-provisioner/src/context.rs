//! Kubectl context reconciliation.
//!
//! After the platform is installed the current kubectl context is pointed at
//! the platform namespace, then checked with a read-only smoke test.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::command;
use crate::error::{ProvisionError, Result};
use crate::executor::CommandExecutor;

/// Namespace kubectl falls back to when the context does not set one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Context and namespace after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledContext {
    pub context: String,
    pub namespace: String,
}

/// Points the current kubectl context at the target namespace.
pub struct ContextReconciler<'a> {
    executor: &'a dyn CommandExecutor,
    kubectl: &'a str,
    kubeconfig: &'a Path,
}

impl<'a> ContextReconciler<'a> {
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, kubectl: &'a str, kubeconfig: &'a Path) -> Self {
        Self {
            executor,
            kubectl,
            kubeconfig,
        }
    }

    /// Resolve the namespace, rewrite the current context and smoke-test it.
    ///
    /// # Errors
    ///
    /// Returns the first kubectl failure. Earlier changes are left in place.
    pub async fn reconcile(
        &self,
        configured_namespace: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ReconciledContext> {
        let namespace = self.resolve_namespace(configured_namespace, cancel).await?;
        let context = self.current_context(cancel).await?;

        info!(context = %context, namespace = %namespace, "Switching context namespace");
        self.executor
            .execute(
                &command::set_context_namespace_command(
                    self.kubectl,
                    self.kubeconfig,
                    &context,
                    &namespace,
                ),
                cancel,
            )
            .await?;

        self.executor
            .execute(
                &command::get_ingress_command(self.kubectl, self.kubeconfig),
                cancel,
            )
            .await?;

        Ok(ReconciledContext { context, namespace })
    }

    /// Prefer the configured namespace, else the one set on the active context.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl cannot be queried.
    pub async fn resolve_namespace(
        &self,
        configured: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if let Some(ns) = configured.filter(|ns| !ns.is_empty()) {
            return Ok(ns.to_string());
        }

        let output = self
            .executor
            .execute_capturing(
                &command::current_namespace_command(self.kubectl, self.kubeconfig),
                cancel,
            )
            .await?;

        let namespace = output.stdout.trim();
        debug!(namespace, "Read namespace from current context");
        if namespace.is_empty() {
            Ok(DEFAULT_NAMESPACE.to_string())
        } else {
            Ok(namespace.to_string())
        }
    }

    /// Name of the current kubectl context.
    ///
    /// # Errors
    ///
    /// Returns an error if kubectl fails or prints no context.
    pub async fn current_context(&self, cancel: &CancellationToken) -> Result<String> {
        let invocation = command::current_context_command(self.kubectl, self.kubeconfig);
        let output = self.executor.execute_capturing(&invocation, cancel).await?;

        let context = output.stdout.trim();
        if context.is_empty() {
            return Err(ProvisionError::MissingOutput {
                what: "a current context".into(),
                command: invocation.to_string(),
            });
        }
        Ok(context.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedExecutor};

    const KUBECONFIG: &str = "/home/u/.bx/config";

    #[tokio::test]
    async fn test_configured_namespace_wins() {
        let executor = ScriptedExecutor::new()
            .on("kubectl config current-context", Scripted::output("tallfrog\n"));
        let reconciler = ContextReconciler::new(&executor, "kubectl", Path::new(KUBECONFIG));

        let result = reconciler
            .reconcile(Some("jx"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            result,
            ReconciledContext {
                context: "tallfrog".into(),
                namespace: "jx".into(),
            }
        );
        assert_eq!(
            executor.command_lines(),
            vec![
                "kubectl config current-context",
                "kubectl config set-context tallfrog --namespace jx",
                "kubectl get ingress",
            ]
        );
    }

    #[tokio::test]
    async fn test_namespace_read_from_context() {
        let executor = ScriptedExecutor::new()
            .on("kubectl config view", Scripted::output("staging"))
            .on("kubectl config current-context", Scripted::output("tallfrog\n"));
        let reconciler = ContextReconciler::new(&executor, "kubectl", Path::new(KUBECONFIG));

        let result = reconciler
            .reconcile(None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.namespace, "staging");
        assert_eq!(
            executor.command_lines()[0],
            "kubectl config view --minify --output jsonpath={..namespace}"
        );
    }

    #[tokio::test]
    async fn test_unset_namespace_falls_back_to_default() {
        let executor = ScriptedExecutor::new()
            .on("kubectl config view", Scripted::output(""))
            .on("kubectl config current-context", Scripted::output("c\n"));
        let reconciler = ContextReconciler::new(&executor, "kubectl", Path::new(KUBECONFIG));

        let namespace = reconciler
            .resolve_namespace(Some(""), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(namespace, DEFAULT_NAMESPACE);
    }

    #[tokio::test]
    async fn test_every_call_uses_extracted_kubeconfig() {
        let executor = ScriptedExecutor::new()
            .on("kubectl config current-context", Scripted::output("c\n"));
        let reconciler = ContextReconciler::new(&executor, "kubectl", Path::new(KUBECONFIG));

        reconciler
            .reconcile(None, &CancellationToken::new())
            .await
            .unwrap();

        for call in executor.calls() {
            assert_eq!(
                call.get_envs(),
                &[("KUBECONFIG".to_string(), KUBECONFIG.to_string())]
            );
        }
    }

    #[tokio::test]
    async fn test_empty_context_is_error() {
        let executor = ScriptedExecutor::new()
            .on("kubectl config current-context", Scripted::output("\n"));
        let reconciler = ContextReconciler::new(&executor, "kubectl", Path::new(KUBECONFIG));

        let err = reconciler
            .reconcile(Some("jx"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::MissingOutput { .. }));
        assert_eq!(executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_smoke_test_failure_surfaces() {
        let executor = ScriptedExecutor::new()
            .on("kubectl config current-context", Scripted::output("c\n"))
            .on("kubectl get ingress", Scripted::fail("forbidden"));
        let reconciler = ContextReconciler::new(&executor, "kubectl", Path::new(KUBECONFIG));

        let err = reconciler
            .reconcile(Some("jx"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("forbidden"));
        assert!(executor
            .command_lines()
            .contains(&"kubectl config set-context c --namespace jx".to_string()));
    }
}

//! Command invocations for the IBM Cloud CLI and kubectl.
//!
//! Builders here are pure: they map resolved values to argument lists and
//! never touch the process environment.

use std::path::Path;

use crate::config::ProvisionRequest;

/// Environment variable kubectl reads its config location from.
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// A single external command: program, ordered arguments and environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CommandInvocation {
    /// Start an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments in order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process only.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn get_envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// Program followed by every argument, as one token list.
    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    fn flag(self, name: &str, value: impl Into<String>) -> Self {
        self.arg(name).arg(value)
    }
}

impl std::fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}

/// Build the silent `cluster-create` invocation for a resolved request.
///
/// Optional flags are appended in a fixed order and only when set.
#[must_use]
pub fn build_create_command(provider: &str, request: &ProvisionRequest) -> CommandInvocation {
    let mut cmd = CommandInvocation::new(provider)
        .args(["cs", "cluster-create", "-s"])
        .flag("--name", &request.cluster_name);

    if let Some(version) = &request.kube_version {
        cmd = cmd.flag("--kube-version", version);
    }
    if let Some(location) = &request.location {
        cmd = cmd.flag("--location", location);
    }
    if let Some(vlan) = &request.public_vlan {
        cmd = cmd.flag("--public-vlan", vlan);
    }
    if let Some(vlan) = &request.private_vlan {
        cmd = cmd.flag("--private-vlan", vlan);
    }
    if request.workers != 1 {
        cmd = cmd.flag("--workers", request.workers.to_string());
    }
    if let Some(machine_type) = &request.machine_type {
        cmd = cmd.flag("--machine-type", machine_type);
    }
    if let Some(hardware) = request.hardware {
        cmd = cmd.flag("--hardware", hardware.to_string());
    }
    if request.no_subnet {
        cmd = cmd.flag("--no-subnet", "true");
    }
    if request.disable_disk_encryption {
        cmd = cmd.flag("--disable-disk-encrypt", "true");
    }
    if request.trusted {
        cmd = cmd.flag("--trusted", "true");
    }

    cmd
}

/// `bx login --sso`
#[must_use]
pub fn login_command(provider: &str) -> CommandInvocation {
    CommandInvocation::new(provider).args(["login", "--sso"])
}

/// `bx cs cluster-config <name>`
#[must_use]
pub fn cluster_config_command(provider: &str, cluster_name: &str) -> CommandInvocation {
    CommandInvocation::new(provider).args(["cs", "cluster-config", cluster_name])
}

fn kubectl(kubectl: &str, kubeconfig: &Path) -> CommandInvocation {
    CommandInvocation::new(kubectl).env(KUBECONFIG_ENV, kubeconfig.to_string_lossy())
}

/// `kubectl config current-context`
#[must_use]
pub fn current_context_command(kubectl_bin: &str, kubeconfig: &Path) -> CommandInvocation {
    kubectl(kubectl_bin, kubeconfig).args(["config", "current-context"])
}

/// `kubectl config view --minify --output jsonpath={..namespace}`
#[must_use]
pub fn current_namespace_command(kubectl_bin: &str, kubeconfig: &Path) -> CommandInvocation {
    kubectl(kubectl_bin, kubeconfig).args([
        "config",
        "view",
        "--minify",
        "--output",
        "jsonpath={..namespace}",
    ])
}

/// `kubectl config set-context <context> --namespace <namespace>`
#[must_use]
pub fn set_context_namespace_command(
    kubectl_bin: &str,
    kubeconfig: &Path,
    context: &str,
    namespace: &str,
) -> CommandInvocation {
    kubectl(kubectl_bin, kubeconfig)
        .args(["config", "set-context", context])
        .flag("--namespace", namespace)
}

/// `kubectl get ingress`
#[must_use]
pub fn get_ingress_command(kubectl_bin: &str, kubeconfig: &Path) -> CommandInvocation {
    kubectl(kubectl_bin, kubeconfig).args(["get", "ingress"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HardwareIsolation;

    #[test]
    fn test_minimal_create_command() {
        let cmd = build_create_command("bx", &ProvisionRequest::named("tallfrog"));
        assert_eq!(
            cmd.tokens(),
            vec!["bx", "cs", "cluster-create", "-s", "--name", "tallfrog"]
        );
        assert!(cmd.get_envs().is_empty());
    }

    #[test]
    fn test_full_create_command_order() {
        let request = ProvisionRequest {
            cluster_name: "prod".into(),
            kube_version: Some("1.10.1".into()),
            location: Some("fra02".into()),
            public_vlan: Some("2234945".into()),
            private_vlan: Some("2234947".into()),
            workers: 3,
            machine_type: Some("u2c.2x4".into()),
            hardware: Some(HardwareIsolation::Dedicated),
            no_subnet: true,
            disable_disk_encryption: true,
            trusted: true,
        };

        assert_eq!(
            build_create_command("bx", &request).to_string(),
            "bx cs cluster-create -s --name prod --kube-version 1.10.1 --location fra02 \
             --public-vlan 2234945 --private-vlan 2234947 --workers 3 --machine-type u2c.2x4 \
             --hardware dedicated --no-subnet true --disable-disk-encrypt true --trusted true"
        );
    }

    #[test]
    fn test_single_worker_is_omitted() {
        let mut request = ProvisionRequest::named("c");
        request.workers = 1;
        assert!(!build_create_command("bx", &request)
            .get_args()
            .contains(&"--workers".to_string()));

        request.workers = 2;
        let cmd = build_create_command("bx", &request);
        let args = cmd.get_args();
        let idx = args.iter().position(|a| a == "--workers").unwrap();
        assert_eq!(args[idx + 1], "2");
    }

    #[test]
    fn test_create_command_is_deterministic() {
        let mut request = ProvisionRequest::named("c");
        request.location = Some("ams03".into());
        request.trusted = true;
        request.hardware = Some(HardwareIsolation::Shared);

        let first = build_create_command("bx", &request);
        for _ in 0..10 {
            assert_eq!(build_create_command("bx", &request), first);
        }
    }

    #[test]
    fn test_kubectl_commands_carry_kubeconfig() {
        let path = Path::new("/home/u/.bx/config");
        for cmd in [
            current_context_command("kubectl", path),
            current_namespace_command("kubectl", path),
            set_context_namespace_command("kubectl", path, "ctx", "jx"),
            get_ingress_command("kubectl", path),
        ] {
            assert_eq!(
                cmd.get_envs(),
                &[(KUBECONFIG_ENV.to_string(), "/home/u/.bx/config".to_string())]
            );
        }
    }

    #[test]
    fn test_set_context_command() {
        let cmd = set_context_namespace_command("kubectl", Path::new("/k"), "mycluster", "jx");
        assert_eq!(
            cmd.to_string(),
            "kubectl config set-context mycluster --namespace jx"
        );
    }

    #[test]
    fn test_provider_commands() {
        assert_eq!(login_command("bx").to_string(), "bx login --sso");
        assert_eq!(
            cluster_config_command("bx", "tallfrog").to_string(),
            "bx cs cluster-config tallfrog"
        );
    }
}

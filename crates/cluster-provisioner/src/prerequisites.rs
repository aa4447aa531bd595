//! Local tool checks run before provisioning starts.

use colored::Colorize;
use tracing::debug;

use crate::config::ProvisionerSettings;
use crate::error::{ProvisionError, Result};
use crate::ui;

/// Validates that the command-line tools provisioning shells out to are installed.
pub struct PrerequisitesValidator {
    requirements: Vec<Requirement>,
}

struct Requirement {
    name: String,
    binary: String,
    install_instructions: String,
}

impl PrerequisitesValidator {
    /// Requirements for the binaries named in `settings`.
    #[must_use]
    pub fn new(settings: &ProvisionerSettings) -> Self {
        let requirements = vec![
            Requirement {
                name: "IBM Cloud CLI".to_string(),
                binary: settings.provider_binary.clone(),
                install_instructions:
                    "Install the IBM Cloud CLI from https://console.bluemix.net/docs/cli/"
                        .to_string(),
            },
            Requirement {
                name: "kubectl".to_string(),
                binary: settings.kubectl_binary.clone(),
                install_instructions:
                    "Install kubectl from https://kubernetes.io/docs/tasks/tools/".to_string(),
            },
            Requirement {
                name: "Platform installer".to_string(),
                binary: settings.installer_binary.clone(),
                install_instructions: "Install jx from https://jenkins-x.io/getting-started/"
                    .to_string(),
            },
        ];

        Self { requirements }
    }

    /// Check every requirement and print the results.
    ///
    /// # Errors
    ///
    /// Returns an error naming every missing tool.
    pub fn validate(&self) -> Result<()> {
        println!();
        let mut failures = Vec::new();

        for requirement in &self.requirements {
            match which::which(&requirement.binary) {
                Ok(path) => {
                    debug!(binary = %requirement.binary, path = %path.display(), "Found tool");
                    ui::print_check_result(&requirement.name, true, None);
                }
                Err(_) => {
                    ui::print_check_result(&requirement.name, false, Some(&requirement.binary));
                    failures.push(requirement);
                }
            }
        }

        println!();

        if failures.is_empty() {
            ui::print_success("All prerequisites met!");
            return Ok(());
        }

        ui::print_warning("Some prerequisites are not met:");
        println!();
        for failure in &failures {
            ui::print_list_item(&format!(
                "{}: {}",
                failure.name.red(),
                failure.install_instructions
            ));
        }
        println!();

        let missing: Vec<_> = failures.iter().map(|f| f.binary.as_str()).collect();
        Err(ProvisionError::Validation(format!(
            "Required tools not found: {}. Please install them and try again.",
            missing.join(", ")
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_present_tools_pass() {
        let settings = ProvisionerSettings {
            provider_binary: "sh".into(),
            kubectl_binary: "sh".into(),
            installer_binary: "sh".into(),
            ..ProvisionerSettings::default()
        };
        assert!(PrerequisitesValidator::new(&settings).validate().is_ok());
    }

    #[test]
    fn test_missing_tool_fails_with_name() {
        let settings = ProvisionerSettings {
            provider_binary: "no-such-bx-binary-9c1e".into(),
            kubectl_binary: "sh".into(),
            installer_binary: "sh".into(),
            ..ProvisionerSettings::default()
        };
        let err = PrerequisitesValidator::new(&settings)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("no-such-bx-binary-9c1e"));
    }
}

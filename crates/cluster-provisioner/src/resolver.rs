//! Flag resolution.
//!
//! Turns the raw [`ClusterFlags`] into a [`ProvisionRequest`]:
//! - the cluster name gets a generated default
//! - location and machine type are validated against their catalogs, and an
//!   invalid value is replaced by an interactive selection
//! - everything else passes through or is omitted

use dialoguer::{theme::ColorfulTheme, Select};
#[cfg(test)]
use mockall::automock;
use tracing::{info, warn};

use crate::catalog;
use crate::config::{ClusterFlags, ProvisionRequest};
use crate::error::{ProvisionError, Result};
use crate::names::NameGenerator;
use crate::ui;

/// Number of options shown at once in a selection prompt.
const PROMPT_PAGE_SIZE: usize = 10;

/// Interactive single-choice selection.
#[cfg_attr(test, automock)]
pub trait Prompter: Send + Sync {
    /// Ask the user to pick one of `options` and return the chosen value.
    fn select(&self, message: &str, options: &[&'static str]) -> Result<String>;
}

/// Terminal prompter backed by `dialoguer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn select(&self, message: &str, options: &[&'static str]) -> Result<String> {
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(options)
            .default(0)
            .max_length(PROMPT_PAGE_SIZE)
            .interact()
            .map_err(|e| ProvisionError::Prompt(e.to_string()))?;

        options
            .get(index)
            .map(|value| (*value).to_string())
            .ok_or_else(|| ProvisionError::Prompt(format!("Selection {index} out of range")))
    }
}

/// Resolves user flags into a provisioning request.
pub struct FlagResolver<'a> {
    prompter: &'a dyn Prompter,
    names: &'a dyn NameGenerator,
    interactive: bool,
}

impl<'a> FlagResolver<'a> {
    #[must_use]
    pub fn new(prompter: &'a dyn Prompter, names: &'a dyn NameGenerator) -> Self {
        Self {
            prompter,
            names,
            interactive: true,
        }
    }

    /// Fail on invalid catalog values instead of prompting.
    #[must_use]
    pub fn batch_mode(mut self, batch_mode: bool) -> Self {
        self.interactive = !batch_mode;
        self
    }

    /// Resolve every flag.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive worker count (or, in batch
    /// mode, an invalid catalog value), and propagates prompt failures.
    pub fn resolve(&self, flags: &ClusterFlags) -> Result<ProvisionRequest> {
        let workers = flags.validate()?;

        let cluster_name = if flags.cluster_name.is_empty() {
            let generated = self.names.generate().to_lowercase();
            info!(cluster = %generated, "No cluster name provided, generated one");
            ui::print_info(&format!(
                "No cluster name provided so using a generated one: {generated}"
            ));
            generated
        } else {
            flags.cluster_name.clone()
        };

        let location = self.validate_or_prompt(
            &flags.location,
            catalog::LOCATIONS,
            "location",
            "IBM Cloud Locations:",
        )?;
        let machine_type = self.validate_or_prompt(
            &flags.machine_type,
            catalog::MACHINE_TYPES,
            "machine type",
            "IBM Cloud Machine Type:",
        )?;

        Ok(ProvisionRequest {
            cluster_name,
            kube_version: non_empty(&flags.kube_version),
            location,
            public_vlan: non_empty(&flags.public_vlan),
            private_vlan: non_empty(&flags.private_vlan),
            workers,
            machine_type,
            hardware: flags.hardware,
            no_subnet: flags.no_subnet,
            disable_disk_encryption: flags.disable_disk_encryption,
            trusted: flags.trusted,
        })
    }

    fn validate_or_prompt(
        &self,
        value: &str,
        valid: &[&'static str],
        what: &str,
        message: &str,
    ) -> Result<Option<String>> {
        if value.is_empty() {
            return Ok(None);
        }
        if catalog::is_valid(value, valid) {
            return Ok(Some(value.to_string()));
        }

        warn!(value, what, "Value not in catalog");
        if !self.interactive {
            return Err(ProvisionError::Validation(format!(
                "Invalid {what} '{value}'. Valid values: {}",
                valid.join(", ")
            )));
        }

        ui::print_warning(&format!("'{value}' is not a valid {what}"));
        self.prompter.select(message, valid).map(Some)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Fleet registrar: the set of addons the hub controller manages.

use crate::addon::AddonDefinition;
use crate::bundle::{cert_bundle, iam_bundle, policy_bundle, ManifestBundle};
use crate::config::AddonDefaults;
use crate::constants::{CERT_ADDON_NAME, IAM_ADDON_NAME, POLICY_ADDON_NAME};
use crate::errors::RegistrationError;
use crate::registration::permission::{governance_policy_rules, RbacApplier};
use crate::registration::{new_registration_option, RbacPermissionConfig};
use crate::values::ValuePipeline;
use std::sync::Arc;
use tracing::info;

/// Registered addon definitions, in registration order.
#[derive(Clone, Debug, Default)]
pub struct FleetRegistrar {
    agents: Vec<Arc<AddonDefinition>>,
}

impl FleetRegistrar {
    /// Empty registrar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one addon.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateAddon`] if an addon with the same name is
    /// already registered. The registrar is left unchanged.
    pub fn add_agent(&mut self, definition: AddonDefinition) -> Result<(), RegistrationError> {
        if self.get(definition.name()).is_some() {
            return Err(RegistrationError::DuplicateAddon {
                addon: definition.name().to_string(),
            });
        }

        info!(
            addon = %definition.name(),
            bundle = %definition.bundle().root(),
            "Registered addon"
        );
        self.agents.push(Arc::new(definition));
        Ok(())
    }

    /// Registered addons, in registration order.
    pub fn agents(&self) -> impl Iterator<Item = &Arc<AddonDefinition>> {
        self.agents.iter()
    }

    /// Names of the registered addons, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.name()).collect()
    }

    /// Look up an addon by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<AddonDefinition>> {
        self.agents.iter().find(|agent| agent.name() == name)
    }

    /// Number of registered addons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no addon is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Registrar with the three governance addons: certificate policy, IAM policy, then the
/// policy framework.
///
/// All three resolve values with the standard pipeline over `defaults`. The policy
/// framework agent additionally gets read/write access to replicated policies on the hub.
///
/// # Errors
///
/// Returns [`RegistrationError`] if a definition fails to build or a name repeats.
pub fn default_registrar(
    defaults: &AddonDefaults,
    applier: Arc<dyn RbacApplier>,
) -> Result<FleetRegistrar, RegistrationError> {
    let mut registrar = FleetRegistrar::new();

    for (name, bundle) in [
        (CERT_ADDON_NAME, cert_bundle()),
        (IAM_ADDON_NAME, iam_bundle()),
        (POLICY_ADDON_NAME, policy_bundle()),
    ] {
        registrar.add_agent(build_definition(name, bundle, defaults, applier.clone())?)?;
    }

    Ok(registrar)
}

fn build_definition(
    name: &str,
    bundle: ManifestBundle,
    defaults: &AddonDefaults,
    applier: Arc<dyn RbacApplier>,
) -> Result<AddonDefinition, RegistrationError> {
    let mut permissions = RbacPermissionConfig::new(name, applier);
    if name == POLICY_ADDON_NAME {
        permissions = permissions.with_rules(governance_policy_rules());
    }

    AddonDefinition::builder(name)
        .with_bundle(bundle)
        .with_pipeline(ValuePipeline::standard(defaults))
        .with_registration(new_registration_option(name, Arc::new(permissions)))
        .build()
}

#[cfg(test)]
#[path = "registrar_tests.rs"]
mod registrar_tests;

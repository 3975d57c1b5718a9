// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Addon descriptors.
//!
//! An [`AddonDefinition`] ties together everything the hub needs to deploy one addon onto
//! the fleet: its name, its manifest bundle, the pipeline resolving per-cluster values and
//! the registration policy of its agents. Definitions are validated once by
//! [`AddonDefinitionBuilder::build`] and are immutable afterwards.
//!
//! # Example
//!
//! ```rust,no_run
//! use grc_addon::addon::AddonDefinition;
//! use grc_addon::bundle::policy_bundle;
//! use grc_addon::config::AddonDefaults;
//! use grc_addon::registration::{new_registration_option, RbacPermissionConfig};
//! use grc_addon::registration::permission::DryRunRbacApplier;
//! use grc_addon::values::ValuePipeline;
//! use std::sync::Arc;
//!
//! let permissions = RbacPermissionConfig::new("policy-controller", Arc::new(DryRunRbacApplier));
//! let addon = AddonDefinition::builder("policy-controller")
//!     .with_bundle(policy_bundle())
//!     .with_pipeline(ValuePipeline::standard(&AddonDefaults::default()))
//!     .with_registration(new_registration_option("policy-controller", Arc::new(permissions)))
//!     .build()?;
//! # Ok::<(), grc_addon::errors::RegistrationError>(())
//! ```

use crate::bundle::ManifestBundle;
use crate::crd::{ManagedCluster, ManagedClusterAddOn};
use crate::errors::{RegistrationError, ValuesError};
use crate::registration::RegistrationOption;
use crate::values::{ValuePipeline, ValueResolver, Values};
use kube::ResourceExt;
use serde::Serialize;

/// Fully described addon, shared read-only across reconciliations.
#[derive(Clone, Debug)]
pub struct AddonDefinition {
    name: String,
    bundle: ManifestBundle,
    pipeline: ValuePipeline,
    registration: RegistrationOption,
}

/// Builder for [`AddonDefinition`].
#[derive(Debug, Default)]
pub struct AddonDefinitionBuilder {
    name: String,
    bundle: Option<ManifestBundle>,
    pipeline: ValuePipeline,
    registration: Option<RegistrationOption>,
}

impl AddonDefinitionBuilder {
    /// Set the manifest bundle.
    #[must_use]
    pub fn with_bundle(mut self, bundle: ManifestBundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// Set the value resolvers, lowest precedence first.
    #[must_use]
    pub fn with_values_resolvers(mut self, resolvers: Vec<ValueResolver>) -> Self {
        self.pipeline = ValuePipeline::new(resolvers);
        self
    }

    /// Set a prebuilt value pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ValuePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Set the registration policy.
    #[must_use]
    pub fn with_registration(mut self, registration: RegistrationOption) -> Self {
        self.registration = Some(registration);
        self
    }

    /// Validate and freeze the definition.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::MissingName`] if the name is empty
    /// - [`RegistrationError::MissingBundle`] if no bundle was set
    /// - [`RegistrationError::MissingRegistration`] if no registration policy was set
    pub fn build(self) -> Result<AddonDefinition, RegistrationError> {
        if self.name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        let bundle = self.bundle.ok_or_else(|| RegistrationError::MissingBundle {
            addon: self.name.clone(),
        })?;
        let registration =
            self.registration
                .ok_or_else(|| RegistrationError::MissingRegistration {
                    addon: self.name.clone(),
                })?;

        Ok(AddonDefinition {
            name: self.name,
            bundle,
            pipeline: self.pipeline,
            registration,
        })
    }
}

impl AddonDefinition {
    /// Start building the definition of `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> AddonDefinitionBuilder {
        AddonDefinitionBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Addon name, also the agent name and the signer's subject component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chart rendered onto each cluster.
    #[must_use]
    pub fn bundle(&self) -> &ManifestBundle {
        &self.bundle
    }

    /// Values pipeline feeding the chart.
    #[must_use]
    pub fn pipeline(&self) -> &ValuePipeline {
        &self.pipeline
    }

    /// CSR signing, approval and permission policy of the agent.
    #[must_use]
    pub fn registration(&self) -> &RegistrationOption {
        &self.registration
    }

    /// Resolve the values document for one cluster.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline's [`ValuesError`].
    pub fn values(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<Values, ValuesError> {
        self.pipeline.resolve(cluster, addon)
    }

    /// Everything the templating engine needs to render this addon for one cluster.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline's [`ValuesError`].
    pub fn render_request(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<RenderRequest, ValuesError> {
        let values = self.values(cluster, addon)?;
        Ok(RenderRequest {
            addon_name: self.name.clone(),
            chart_root: self.bundle.root().to_string(),
            values,
            builtin: BuiltinValues {
                cluster_name: cluster.name_any(),
                addon_install_namespace: addon.install_namespace().to_string(),
                hub_kube_config_secret: format!("{}-hub-kubeconfig", self.name),
                kube_version: cluster.kube_version().map(str::to_string),
            },
        })
    }
}

/// Input of one chart rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Addon being rendered
    pub addon_name: String,
    /// Root of the chart inside the bundle
    pub chart_root: String,
    /// Resolved values document
    pub values: Values,
    /// Values the addon framework supplies to every chart
    pub builtin: BuiltinValues,
}

/// Values every chart receives regardless of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltinValues {
    /// Managed cluster name
    pub cluster_name: String,
    /// Namespace the agent is installed into
    pub addon_install_namespace: String,
    /// Secret holding the agent's hub kubeconfig
    pub hub_kube_config_secret: String,
    /// Kubernetes version of the managed cluster, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,
}

#[cfg(test)]
#[path = "addon_tests.rs"]
mod addon_tests;

// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Open Cluster Management resource types consumed by the addon.
//!
//! Only the fields the values pipeline and the registration policy read are modelled;
//! everything else on these objects is owned by the hub's registration and addon managers.
//!
//! # Resource Types
//!
//! - [`ManagedCluster`] - A cluster participating in the fleet (cluster scoped)
//! - [`ManagedClusterAddOn`] - One addon installed on one managed cluster, living in the
//!   cluster's namespace on the hub
//!
//! # Example
//!
//! ```rust,no_run
//! use grc_addon::crd::{ManagedClusterAddOn, ManagedClusterAddOnSpec};
//!
//! let addon = ManagedClusterAddOn::new(
//!     "policy-controller",
//!     ManagedClusterAddOnSpec {
//!         install_namespace: Some("open-cluster-management-agent-addon".to_string()),
//!     },
//! );
//! ```

use crate::constants::DEFAULT_INSTALL_NAMESPACE;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `ManagedCluster` describes a cluster registered with the hub.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1",
    kind = "ManagedCluster",
    doc = "ManagedCluster represents a cluster joined to the hub. The registration agent on the managed cluster keeps its status current."
)]
#[kube(status = "ManagedClusterStatus")]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    /// Whether the hub accepts the cluster's registration agent.
    #[serde(default)]
    pub hub_accepts_client: bool,

    /// Lease duration of the registration agent, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_duration_seconds: Option<i32>,
}

/// Status reported by the registration agent on the managed cluster.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterStatus {
    /// Platform versions of the managed cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<ManagedClusterVersion>,
}

/// Platform versions reported by a managed cluster.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterVersion {
    /// Kubernetes version, e.g. "1.10.1".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<String>,
}

impl ManagedCluster {
    /// Kubernetes version the cluster last reported, if any.
    #[must_use]
    pub fn kube_version(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|status| status.version.as_ref())
            .and_then(|version| version.kubernetes.as_deref())
    }
}

/// `ManagedClusterAddOn` is the per-cluster instance of an addon.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "addon.open-cluster-management.io",
    version = "v1alpha1",
    kind = "ManagedClusterAddOn",
    namespaced,
    doc = "ManagedClusterAddOn enables one addon on one managed cluster. It lives in the managed cluster's namespace on the hub and carries the value annotations for that cluster."
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterAddOnSpec {
    /// Namespace on the managed cluster the agent is deployed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_namespace: Option<String>,
}

impl ManagedClusterAddOn {
    /// Install namespace on the managed cluster, falling back to the framework default when
    /// unset or empty.
    #[must_use]
    pub fn install_namespace(&self) -> &str {
        match self.spec.install_namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => DEFAULT_INSTALL_NAMESPACE,
        }
    }

    /// Value of an annotation, treating a missing annotation as empty.
    #[must_use]
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations().get(key).map_or("", String::as_str)
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;

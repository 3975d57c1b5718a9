// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Hub permission assignment for addon agents.
//!
//! Once an agent's CSR is approved, the agent needs RBAC on the hub to read its own
//! `ManagedClusterAddOn`, report status and hold its lease. [`RbacPermissionConfig`] builds
//! one `Role` and one `RoleBinding` in the cluster namespace on the hub, bound to the group
//! every agent of the addon on that cluster belongs to. The builders are pure; writes go
//! through the [`RbacApplier`] seam.

use crate::constants::{ADDON_API_GROUP, COORDINATION_API_GROUP, POLICY_API_GROUP, RBAC_API_GROUP};
use crate::crd::{ManagedCluster, ManagedClusterAddOn};
use crate::errors::PermissionError;
use crate::labels::{
    CSR_ADDON_NAME_LABEL, K8S_COMPONENT, K8S_MANAGED_BY, K8S_PART_OF, MANAGED_BY_GRC_ADDON,
    PART_OF_GRC,
};
use crate::registration::signer::cluster_addon_group;
use crate::resources::create_or_apply;
use async_trait::async_trait;
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Client, Resource, ResourceExt};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Component label value on agent RBAC objects
const COMPONENT_ADDON_AGENT: &str = "addon-agent";

/// Grants an addon agent its hub permissions.
#[async_trait]
pub trait PermissionConfigurer: Send + Sync + fmt::Debug {
    /// Ensure the agent of `addon` on `cluster` has its hub permissions.
    ///
    /// Must be idempotent: calling it again with the same inputs converges without extra
    /// effect.
    async fn configure(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<(), PermissionError>;
}

/// Writes RBAC objects to the hub.
#[async_trait]
pub trait RbacApplier: Send + Sync {
    /// Create or update a namespaced `Role`.
    async fn apply_role(&self, role: &Role) -> anyhow::Result<()>;

    /// Create or update a namespaced `RoleBinding`.
    async fn apply_role_binding(&self, binding: &RoleBinding) -> anyhow::Result<()>;
}

/// Applies RBAC objects to the hub API server with server-side apply.
#[derive(Clone)]
pub struct KubeRbacApplier {
    client: Client,
    field_manager: String,
}

impl KubeRbacApplier {
    /// Applier writing through `client` as `field_manager`.
    #[must_use]
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }
}

#[async_trait]
impl RbacApplier for KubeRbacApplier {
    async fn apply_role(&self, role: &Role) -> anyhow::Result<()> {
        let namespace = role.namespace().unwrap_or_default();
        create_or_apply(&self.client, &namespace, role, &self.field_manager).await
    }

    async fn apply_role_binding(&self, binding: &RoleBinding) -> anyhow::Result<()> {
        let namespace = binding.namespace().unwrap_or_default();
        create_or_apply(&self.client, &namespace, binding, &self.field_manager).await
    }
}

/// Logs RBAC objects instead of writing them.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunRbacApplier;

#[async_trait]
impl RbacApplier for DryRunRbacApplier {
    async fn apply_role(&self, role: &Role) -> anyhow::Result<()> {
        info!(
            "[DRY RUN] Would apply Role {}/{}:\n{}",
            role.namespace().unwrap_or_default(),
            role.name_any(),
            serde_yaml::to_string(role)?
        );
        Ok(())
    }

    async fn apply_role_binding(&self, binding: &RoleBinding) -> anyhow::Result<()> {
        info!(
            "[DRY RUN] Would apply RoleBinding {}/{}:\n{}",
            binding.namespace().unwrap_or_default(),
            binding.name_any(),
            serde_yaml::to_string(binding)?
        );
        Ok(())
    }
}

/// RBAC-based permission configurer for one addon.
#[derive(Clone)]
pub struct RbacPermissionConfig {
    addon_name: String,
    rules: Vec<PolicyRule>,
    applier: Arc<dyn RbacApplier>,
}

impl fmt::Debug for RbacPermissionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbacPermissionConfig")
            .field("addon_name", &self.addon_name)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl RbacPermissionConfig {
    /// Configurer granting the default agent rules for `addon_name`.
    #[must_use]
    pub fn new(addon_name: impl Into<String>, applier: Arc<dyn RbacApplier>) -> Self {
        let addon_name = addon_name.into();
        Self {
            rules: default_agent_rules(&addon_name),
            addon_name,
            applier,
        }
    }

    /// Append extra rules to the agent role.
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = PolicyRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Addon whose agents this configurer serves.
    #[must_use]
    pub fn addon_name(&self) -> &str {
        &self.addon_name
    }

    /// Rules granted to the agent role.
    #[must_use]
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Name shared by the agent `Role` and `RoleBinding`.
    #[must_use]
    pub fn role_name(&self) -> String {
        format!("open-cluster-management:{}:agent", self.addon_name)
    }

    /// Build the agent `Role` for `addon` on `cluster`.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidInput`] if the cluster has no name or `addon` is
    /// another addon.
    pub fn build_role(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<Role, PermissionError> {
        let namespace = self.target_namespace(cluster, addon)?;
        Ok(Role {
            metadata: self.object_meta(&namespace, addon),
            rules: Some(self.rules.clone()),
        })
    }

    /// Build the `RoleBinding` granting the agent `Role` to the cluster/addon group.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RbacPermissionConfig::build_role`].
    pub fn build_role_binding(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<RoleBinding, PermissionError> {
        let namespace = self.target_namespace(cluster, addon)?;
        Ok(RoleBinding {
            metadata: self.object_meta(&namespace, addon),
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "Role".to_string(),
                name: self.role_name(),
            },
            subjects: Some(vec![Subject {
                api_group: Some(RBAC_API_GROUP.to_string()),
                kind: "Group".to_string(),
                name: cluster_addon_group(&cluster.name_any(), &self.addon_name),
                namespace: None,
            }]),
        })
    }

    /// Hub namespace of the agent's RBAC objects: the addon's namespace, which is the
    /// cluster namespace.
    fn target_namespace(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<String, PermissionError> {
        let cluster_name = cluster.name_any();
        if cluster_name.is_empty() {
            return Err(self.invalid("managed cluster has no name"));
        }
        if addon.name_any() != self.addon_name {
            return Err(self.invalid(&format!(
                "ManagedClusterAddOn '{}' belongs to another addon",
                addon.name_any()
            )));
        }
        Ok(addon
            .namespace()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(cluster_name))
    }

    fn invalid(&self, reason: &str) -> PermissionError {
        PermissionError::InvalidInput {
            addon: self.addon_name.clone(),
            reason: reason.to_string(),
        }
    }

    fn object_meta(&self, namespace: &str, addon: &ManagedClusterAddOn) -> ObjectMeta {
        let mut labels = BTreeMap::new();
        labels.insert(K8S_MANAGED_BY.to_string(), MANAGED_BY_GRC_ADDON.to_string());
        labels.insert(K8S_PART_OF.to_string(), PART_OF_GRC.to_string());
        labels.insert(K8S_COMPONENT.to_string(), COMPONENT_ADDON_AGENT.to_string());
        labels.insert(CSR_ADDON_NAME_LABEL.to_string(), self.addon_name.clone());

        ObjectMeta {
            name: Some(self.role_name()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            owner_references: addon.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PermissionConfigurer for RbacPermissionConfig {
    async fn configure(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<(), PermissionError> {
        let role = self.build_role(cluster, addon)?;
        let binding = self.build_role_binding(cluster, addon)?;
        let namespace = role.namespace().unwrap_or_default();
        let name = self.role_name();

        debug!(
            cluster = %cluster.name_any(),
            addon = %self.addon_name,
            namespace = %namespace,
            "Applying agent RBAC"
        );

        self.applier
            .apply_role(&role)
            .await
            .map_err(|source| PermissionError::Apply {
                kind: "Role".to_string(),
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?;

        self.applier
            .apply_role_binding(&binding)
            .await
            .map_err(|source| PermissionError::Apply {
                kind: "RoleBinding".to_string(),
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?;

        info!(
            cluster = %cluster.name_any(),
            addon = %self.addon_name,
            namespace = %namespace,
            role = %name,
            "Agent hub permissions in place"
        );
        Ok(())
    }
}

/// Rules every addon agent needs on the hub.
///
/// - read its own `ManagedClusterAddOn`
/// - update that addon's status
/// - manage leases in the cluster namespace
/// - emit events
#[must_use]
pub fn default_agent_rules(addon_name: &str) -> Vec<PolicyRule> {
    vec![
        PolicyRule {
            api_groups: Some(vec![ADDON_API_GROUP.to_string()]),
            resources: Some(vec!["managedclusteraddons".to_string()]),
            resource_names: Some(vec![addon_name.to_string()]),
            verbs: verbs(&["get", "list", "watch"]),
            ..Default::default()
        },
        PolicyRule {
            api_groups: Some(vec![ADDON_API_GROUP.to_string()]),
            resources: Some(vec!["managedclusteraddons/status".to_string()]),
            resource_names: Some(vec![addon_name.to_string()]),
            verbs: verbs(&["patch", "update"]),
            ..Default::default()
        },
        PolicyRule {
            api_groups: Some(vec![COORDINATION_API_GROUP.to_string()]),
            resources: Some(vec!["leases".to_string()]),
            verbs: verbs(&["get", "list", "watch", "create", "update", "patch"]),
            ..Default::default()
        },
        PolicyRule {
            api_groups: Some(vec![String::new()]),
            resources: Some(vec!["events".to_string()]),
            verbs: verbs(&["create", "patch"]),
            ..Default::default()
        },
    ]
}

/// Extra rules for the policy framework agent, which syncs replicated policies and their
/// status with the hub.
#[must_use]
pub fn governance_policy_rules() -> Vec<PolicyRule> {
    vec![
        PolicyRule {
            api_groups: Some(vec![POLICY_API_GROUP.to_string()]),
            resources: Some(vec!["policies".to_string()]),
            verbs: verbs(&["get", "list", "watch", "update", "patch"]),
            ..Default::default()
        },
        PolicyRule {
            api_groups: Some(vec![POLICY_API_GROUP.to_string()]),
            resources: Some(vec!["policies/status".to_string()]),
            verbs: verbs(&["get", "patch", "update"]),
            ..Default::default()
        },
    ]
}

fn verbs(verbs: &[&str]) -> Vec<String> {
    verbs.iter().map(|v| (*v).to_string()).collect()
}

#[cfg(test)]
#[path = "permission_tests.rs"]
mod permission_tests;

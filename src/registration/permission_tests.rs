// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Unit tests for `permission.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec, ManagedClusterSpec};
    use crate::errors::PermissionError;
    use crate::labels::{K8S_MANAGED_BY, MANAGED_BY_GRC_ADDON};
    use crate::registration::permission::{
        default_agent_rules, governance_policy_rules, DryRunRbacApplier, PermissionConfigurer,
        RbacApplier, RbacPermissionConfig,
    };
    use async_trait::async_trait;
    use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
    use kube::ResourceExt;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// Applier that keeps objects in memory and counts writes that changed something.
    #[derive(Default)]
    struct MemoryApplier {
        objects: Mutex<BTreeMap<String, serde_json::Value>>,
        changes: Mutex<usize>,
        fail_bindings: bool,
    }

    impl MemoryApplier {
        fn store<T: serde::Serialize>(&self, key: String, object: &T) -> anyhow::Result<()> {
            let value = serde_json::to_value(object)?;
            let mut objects = self.objects.lock().unwrap();
            if objects.get(&key) != Some(&value) {
                objects.insert(key, value);
                *self.changes.lock().unwrap() += 1;
            }
            Ok(())
        }

        fn changes(&self) -> usize {
            *self.changes.lock().unwrap()
        }

        fn len(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RbacApplier for MemoryApplier {
        async fn apply_role(&self, role: &Role) -> anyhow::Result<()> {
            let key = format!("Role/{}/{}", role.namespace().unwrap_or_default(), role.name_any());
            self.store(key, role)
        }

        async fn apply_role_binding(&self, binding: &RoleBinding) -> anyhow::Result<()> {
            if self.fail_bindings {
                anyhow::bail!("hub unavailable");
            }
            let key = format!(
                "RoleBinding/{}/{}",
                binding.namespace().unwrap_or_default(),
                binding.name_any()
            );
            self.store(key, binding)
        }
    }

    fn cluster(name: &str) -> ManagedCluster {
        ManagedCluster::new(name, ManagedClusterSpec::default())
    }

    fn addon(name: &str, namespace: &str) -> ManagedClusterAddOn {
        let mut addon = ManagedClusterAddOn::new(name, ManagedClusterAddOnSpec::default());
        addon.metadata.namespace = Some(namespace.to_string());
        addon
    }

    #[test]
    fn test_build_role() {
        let config = RbacPermissionConfig::new("policy-controller", Arc::new(DryRunRbacApplier));
        let role = config
            .build_role(&cluster("cluster1"), &addon("policy-controller", "cluster1"))
            .unwrap();

        assert_eq!(role.name_any(), "open-cluster-management:policy-controller:agent");
        assert_eq!(role.namespace().as_deref(), Some("cluster1"));
        assert_eq!(
            role.labels().get(K8S_MANAGED_BY).map(String::as_str),
            Some(MANAGED_BY_GRC_ADDON)
        );
        assert_eq!(role.rules.unwrap(), default_agent_rules("policy-controller"));
    }

    #[test]
    fn test_default_rules_scope_addon_to_itself() {
        let rules = default_agent_rules("cert-policy-controller");
        let addon_rule = &rules[0];

        assert_eq!(
            addon_rule.resources.as_deref(),
            Some(&["managedclusteraddons".to_string()][..])
        );
        assert_eq!(
            addon_rule.resource_names.as_deref(),
            Some(&["cert-policy-controller".to_string()][..])
        );
        assert!(!addon_rule.verbs.contains(&"delete".to_string()));
        assert!(rules
            .iter()
            .any(|rule| rule.resources.as_deref() == Some(&["leases".to_string()][..])));
    }

    #[test]
    fn test_with_rules_appends() {
        let config = RbacPermissionConfig::new("policy-controller", Arc::new(DryRunRbacApplier))
            .with_rules(governance_policy_rules());

        assert_eq!(
            config.rules().len(),
            default_agent_rules("policy-controller").len() + governance_policy_rules().len()
        );
    }

    #[test]
    fn test_build_role_binding_targets_cluster_addon_group() {
        let config = RbacPermissionConfig::new("iam-policy-controller", Arc::new(DryRunRbacApplier));
        let binding = config
            .build_role_binding(&cluster("cluster1"), &addon("iam-policy-controller", "cluster1"))
            .unwrap();

        assert_eq!(binding.role_ref.kind, "Role");
        assert_eq!(binding.role_ref.name, config.role_name());

        let subjects = binding.subjects.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].kind, "Group");
        assert_eq!(
            subjects[0].name,
            "system:open-cluster-management:cluster:cluster1:addon:iam-policy-controller"
        );
    }

    #[test]
    fn test_namespace_falls_back_to_cluster_name() {
        let config = RbacPermissionConfig::new("policy-controller", Arc::new(DryRunRbacApplier));
        let addon = ManagedClusterAddOn::new("policy-controller", ManagedClusterAddOnSpec::default());

        let role = config.build_role(&cluster("cluster2"), &addon).unwrap();
        assert_eq!(role.namespace().as_deref(), Some("cluster2"));
    }

    #[test]
    fn test_rejects_other_addon() {
        let config = RbacPermissionConfig::new("policy-controller", Arc::new(DryRunRbacApplier));
        let err = config
            .build_role(&cluster("cluster1"), &addon("iam-policy-controller", "cluster1"))
            .unwrap_err();

        assert!(matches!(err, PermissionError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_unnamed_cluster() {
        let config = RbacPermissionConfig::new("policy-controller", Arc::new(DryRunRbacApplier));
        let err = config
            .build_role(&cluster(""), &addon("policy-controller", "cluster1"))
            .unwrap_err();

        assert!(matches!(err, PermissionError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_configure_is_idempotent() {
        let applier = Arc::new(MemoryApplier::default());
        let config = RbacPermissionConfig::new("policy-controller", applier.clone());
        let cluster = cluster("cluster1");
        let addon = addon("policy-controller", "cluster1");

        config.configure(&cluster, &addon).await.unwrap();
        assert_eq!(applier.len(), 2);
        assert_eq!(applier.changes(), 2);

        config.configure(&cluster, &addon).await.unwrap();
        assert_eq!(applier.len(), 2);
        assert_eq!(applier.changes(), 2);
    }

    #[tokio::test]
    async fn test_configure_reports_apply_failure() {
        let applier = Arc::new(MemoryApplier {
            fail_bindings: true,
            ..Default::default()
        });
        let config = RbacPermissionConfig::new("policy-controller", applier.clone());

        let err = config
            .configure(&cluster("cluster1"), &addon("policy-controller", "cluster1"))
            .await
            .unwrap_err();

        match err {
            PermissionError::Apply { kind, namespace, .. } => {
                assert_eq!(kind, "RoleBinding");
                assert_eq!(namespace, "cluster1");
            }
            other => panic!("expected apply error, got {other:?}"),
        }
        // The role was written before the binding failed; a retry converges
        assert_eq!(applier.len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_applier_succeeds() {
        let config = RbacPermissionConfig::new("cert-policy-controller", Arc::new(DryRunRbacApplier));
        config
            .configure(&cluster("cluster1"), &addon("cert-policy-controller", "cluster1"))
            .await
            .unwrap();
    }
}

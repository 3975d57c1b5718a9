// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Unit tests for `signer.rs`

#[cfg(test)]
mod tests {
    use crate::registration::signer::{
        default_groups, default_user, kube_client_signer_configurations,
    };

    #[test]
    fn test_default_user() {
        assert_eq!(
            default_user("test", "policy-controller", "policy-controller"),
            "system:open-cluster-management:cluster:test:addon:policy-controller:agent:policy-controller"
        );
    }

    #[test]
    fn test_default_groups_most_specific_first() {
        assert_eq!(
            default_groups("test", "iam-policy-controller"),
            vec![
                "system:open-cluster-management:cluster:test:addon:iam-policy-controller",
                "system:open-cluster-management:addon:iam-policy-controller",
                "system:authenticated",
            ]
        );
    }

    #[test]
    fn test_configurations_use_kube_client_signer() {
        let signer = kube_client_signer_configurations("cert-policy-controller", "cert-policy-controller");
        let configs = signer.configurations("cluster1");

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].signer_name, "kubernetes.io/kube-apiserver-client");
        assert_eq!(
            configs[0].subject.user,
            "system:open-cluster-management:cluster:cluster1:addon:cert-policy-controller:agent:cert-policy-controller"
        );
        assert!(configs[0].subject.organization_units.is_empty());
    }

    #[test]
    fn test_identities_are_isolated_per_addon() {
        let cert = kube_client_signer_configurations("cert-policy-controller", "cert-policy-controller");
        let iam = kube_client_signer_configurations("iam-policy-controller", "iam-policy-controller");

        let cert_subject = cert.expected_subject("test");
        let iam_subject = iam.expected_subject("test");

        assert_ne!(cert_subject.user, iam_subject.user);
        assert_ne!(cert_subject.groups[0], iam_subject.groups[0]);
        assert_ne!(cert_subject.groups[1], iam_subject.groups[1]);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = kube_client_signer_configurations("policy-controller", "policy-controller");
        let b = kube_client_signer_configurations("policy-controller", "policy-controller");
        assert_eq!(a.configurations("x"), b.configurations("x"));
        assert_eq!(a.addon_name(), "policy-controller");
        assert_eq!(a.agent_name(), "policy-controller");
    }
}

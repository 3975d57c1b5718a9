// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Unit tests for `registration/mod.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{
        ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec, ManagedClusterSpec,
    };
    use crate::errors::PermissionError;
    use crate::registration::{
        new_registration_option, CsrDecision, CsrRejection, PermissionConfigurer,
        RegistrationPhase,
    };
    use async_trait::async_trait;
    use k8s_openapi::api::certificates::v1::{
        CertificateSigningRequest, CertificateSigningRequestSpec,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use k8s_openapi::ByteString;
    use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, KeyPair};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const CLUSTER: &str = "cluster1";
    const ADDON: &str = "iam-policy-controller";

    /// Configurer that counts calls and optionally fails.
    #[derive(Debug, Default)]
    struct CountingConfigurer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PermissionConfigurer for CountingConfigurer {
        async fn configure(
            &self,
            _cluster: &ManagedCluster,
            _addon: &ManagedClusterAddOn,
        ) -> Result<(), PermissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PermissionError::Apply {
                    kind: "Role".to_string(),
                    namespace: CLUSTER.to_string(),
                    name: "agent".to_string(),
                    source: anyhow::anyhow!("hub unavailable"),
                });
            }
            Ok(())
        }
    }

    fn cluster() -> ManagedCluster {
        ManagedCluster::new(CLUSTER, ManagedClusterSpec::default())
    }

    fn addon() -> ManagedClusterAddOn {
        let mut addon = ManagedClusterAddOn::new(ADDON, ManagedClusterAddOnSpec::default());
        addon.metadata.namespace = Some(CLUSTER.to_string());
        addon
    }

    fn csr(signer: &str) -> CertificateSigningRequest {
        let key_pair = KeyPair::generate().expect("key generation");
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(
            DnType::CommonName,
            DnValue::Utf8String(format!(
                "system:open-cluster-management:cluster:{CLUSTER}:addon:{ADDON}:agent:{ADDON}"
            )),
        );
        dn.push(
            DnType::OrganizationName,
            DnValue::Utf8String(format!(
                "system:open-cluster-management:cluster:{CLUSTER}:addon:{ADDON}"
            )),
        );
        // second organization under the raw OID, rcgen keeps one entry per DnType
        dn.push(
            DnType::CustomDnType(vec![2, 5, 4, 10]),
            DnValue::Utf8String(format!("system:open-cluster-management:addon:{ADDON}")),
        );
        params.distinguished_name = dn;
        let pem = params
            .serialize_request(&key_pair)
            .expect("csr")
            .pem()
            .expect("csr pem");

        let labels = BTreeMap::from([
            (
                "open-cluster-management.io/cluster-name".to_string(),
                CLUSTER.to_string(),
            ),
            (
                "open-cluster-management.io/addon-name".to_string(),
                ADDON.to_string(),
            ),
        ]);

        CertificateSigningRequest {
            metadata: ObjectMeta {
                name: Some("addon-cluster1-iam-policy-controller-x7k2p".to_string()),
                labels: Some(labels),
                ..Default::default()
            },
            spec: CertificateSigningRequestSpec {
                signer_name: signer.to_string(),
                request: ByteString(pem.into_bytes()),
                username: Some(format!("system:open-cluster-management:{CLUSTER}:x7k2p")),
                ..Default::default()
            },
            status: None,
        }
    }

    #[test]
    fn test_new_registration_option_uses_addon_as_agent() {
        let option = new_registration_option(ADDON, Arc::new(CountingConfigurer::default()));

        assert_eq!(option.signer().addon_name(), ADDON);
        assert_eq!(option.signer().agent_name(), ADDON);

        let configs = option.csr_configurations(&cluster());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].signer_name, "kubernetes.io/kube-apiserver-client");
        assert_eq!(
            configs[0].subject.user,
            format!("system:open-cluster-management:cluster:{CLUSTER}:addon:{ADDON}:agent:{ADDON}")
        );
    }

    #[test]
    fn test_evaluate_csr_uses_default_approver() {
        let option = new_registration_option(ADDON, Arc::new(CountingConfigurer::default()));

        assert_eq!(
            option.evaluate_csr(&cluster(), &addon(), &csr("kubernetes.io/kube-apiserver-client")),
            CsrDecision::Approved
        );
        assert!(matches!(
            option.evaluate_csr(&cluster(), &addon(), &csr("example.com/custom")),
            CsrDecision::Rejected(CsrRejection::SignerMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_handle_csr_grants_permissions_on_approval() {
        let configurer = Arc::new(CountingConfigurer::default());
        let option = new_registration_option(ADDON, configurer.clone());

        let phase = option
            .handle_csr(&cluster(), &addon(), &csr("kubernetes.io/kube-apiserver-client"))
            .await;

        assert_eq!(phase, RegistrationPhase::PermissionsGranted);
        assert_eq!(configurer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handle_csr_skips_permissions_on_rejection() {
        let configurer = Arc::new(CountingConfigurer::default());
        let option = new_registration_option(ADDON, configurer.clone());

        let phase = option
            .handle_csr(&cluster(), &addon(), &csr("example.com/custom"))
            .await;

        assert!(matches!(phase, RegistrationPhase::Rejected(_)));
        assert_eq!(configurer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_csr_stays_approved_when_grant_fails() {
        let configurer = Arc::new(CountingConfigurer {
            fail: true,
            ..Default::default()
        });
        let option = new_registration_option(ADDON, configurer.clone());

        let phase = option
            .handle_csr(&cluster(), &addon(), &csr("kubernetes.io/kube-apiserver-client"))
            .await;

        assert_eq!(phase, RegistrationPhase::Approved);
        assert_eq!(configurer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_option_debug_names_parts() {
        let option = new_registration_option(ADDON, Arc::new(CountingConfigurer::default()));
        let debug = format!("{option:?}");

        assert!(debug.contains("RegistrationOption"));
        assert!(debug.contains(ADDON));
    }
}

// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use grc_addon::crd::{
    ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec, ManagedClusterSpec,
};
use k8s_openapi::api::certificates::v1::{CertificateSigningRequest, CertificateSigningRequestSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::client::Client;
use rcgen::{CertificateParams, DistinguishedName, DnType, DnValue, KeyPair};
use std::collections::BTreeMap;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Managed cluster with only a name
pub fn cluster(name: &str) -> ManagedCluster {
    ManagedCluster::new(name, ManagedClusterSpec::default())
}

/// Addon in the cluster namespace with the given annotations
pub fn addon(name: &str, cluster: &str, annotations: &[(&str, &str)]) -> ManagedClusterAddOn {
    let mut addon = ManagedClusterAddOn::new(name, ManagedClusterAddOnSpec::default());
    addon.metadata.namespace = Some(cluster.to_string());
    if !annotations.is_empty() {
        addon.metadata.annotations = Some(
            annotations
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
    }
    addon
}

/// PEM certificate request with the given subject, at most two organizations
pub fn request_pem(common_name: &str, organizations: &[String]) -> String {
    assert!(organizations.len() <= 2, "at most two organizations");
    let key_pair = KeyPair::generate().expect("key generation");
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, DnValue::Utf8String(common_name.to_string()));
    // rcgen keeps one entry per DnType, so the second organization uses its raw OID
    let org_types = [
        DnType::OrganizationName,
        DnType::CustomDnType(vec![2, 5, 4, 10]),
    ];
    for (ty, org) in org_types.into_iter().zip(organizations) {
        dn.push(ty, DnValue::Utf8String(org.clone()));
    }
    params.distinguished_name = dn;
    params
        .serialize_request(&key_pair)
        .expect("csr")
        .pem()
        .expect("csr pem")
}

/// CSR as submitted by the registration agent of `addon` on `cluster`
pub fn agent_csr(cluster: &str, addon: &str, signer: &str, request: &str) -> CertificateSigningRequest {
    let labels = BTreeMap::from([
        (
            "open-cluster-management.io/cluster-name".to_string(),
            cluster.to_string(),
        ),
        (
            "open-cluster-management.io/addon-name".to_string(),
            addon.to_string(),
        ),
    ]);

    CertificateSigningRequest {
        metadata: ObjectMeta {
            name: Some(format!("addon-{cluster}-{addon}-4kq9z")),
            labels: Some(labels),
            ..Default::default()
        },
        spec: CertificateSigningRequestSpec {
            signer_name: signer.to_string(),
            request: ByteString(request.as_bytes().to_vec()),
            username: Some(format!("system:open-cluster-management:{cluster}:4kq9z")),
            ..Default::default()
        },
        status: None,
    }
}

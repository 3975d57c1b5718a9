// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Signer configuration for addon agent identities.
//!
//! Every addon agent authenticates to the hub with a client certificate issued by the
//! `kubernetes.io/kube-apiserver-client` signer. The certificate subject is derived from the
//! cluster and addon names, so each addon gets an isolated identity namespace:
//!
//! ```text
//! user:   system:open-cluster-management:cluster:<cluster>:addon:<addon>:agent:<agent>
//! groups: system:open-cluster-management:cluster:<cluster>:addon:<addon>
//!         system:open-cluster-management:addon:<addon>
//!         system:authenticated
//! ```

use crate::constants::{AUTHENTICATED_GROUP, IDENTITY_PREFIX, KUBE_APISERVER_CLIENT_SIGNER};

/// Certificate subject an agent must request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    /// Common name of the certificate
    pub user: String,
    /// Organizations of the certificate
    pub groups: Vec<String>,
    /// Organizational units of the certificate
    pub organization_units: Vec<String>,
}

/// One signer an agent's CSR may target, with the subject it must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignerConfiguration {
    /// Kubernetes signer name
    pub signer_name: String,
    /// Expected subject
    pub subject: Subject,
}

/// Identity strategy of an addon whose agent uses a kube API server client certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KubeClientSigner {
    addon_name: String,
    agent_name: String,
}

impl KubeClientSigner {
    /// Strategy for `addon_name`, whose agent identifies itself as `agent_name`.
    #[must_use]
    pub fn new(addon_name: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            addon_name: addon_name.into(),
            agent_name: agent_name.into(),
        }
    }

    /// Addon the identities belong to.
    #[must_use]
    pub fn addon_name(&self) -> &str {
        &self.addon_name
    }

    /// Agent name embedded in the user name.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Signer every CSR must name.
    #[must_use]
    pub fn signer_name(&self) -> &'static str {
        KUBE_APISERVER_CLIENT_SIGNER
    }

    /// Subject an agent on `cluster_name` must request.
    #[must_use]
    pub fn expected_subject(&self, cluster_name: &str) -> Subject {
        Subject {
            user: default_user(cluster_name, &self.addon_name, &self.agent_name),
            groups: default_groups(cluster_name, &self.addon_name),
            organization_units: Vec::new(),
        }
    }

    /// Signer configurations for one cluster.
    #[must_use]
    pub fn configurations(&self, cluster_name: &str) -> Vec<SignerConfiguration> {
        vec![SignerConfiguration {
            signer_name: self.signer_name().to_string(),
            subject: self.expected_subject(cluster_name),
        }]
    }
}

/// Signer strategy for an addon whose agent authenticates with a kube client certificate.
#[must_use]
pub fn kube_client_signer_configurations(addon_name: &str, agent_name: &str) -> KubeClientSigner {
    KubeClientSigner::new(addon_name, agent_name)
}

/// User name of an addon agent on one cluster.
#[must_use]
pub fn default_user(cluster_name: &str, addon_name: &str, agent_name: &str) -> String {
    format!("{IDENTITY_PREFIX}:cluster:{cluster_name}:addon:{addon_name}:agent:{agent_name}")
}

/// Group shared by every agent of one addon on one cluster.
#[must_use]
pub fn cluster_addon_group(cluster_name: &str, addon_name: &str) -> String {
    format!("{IDENTITY_PREFIX}:cluster:{cluster_name}:addon:{addon_name}")
}

/// Group shared by every agent of one addon across the fleet.
#[must_use]
pub fn addon_group(addon_name: &str) -> String {
    format!("{IDENTITY_PREFIX}:addon:{addon_name}")
}

/// Groups of an addon agent on one cluster, most specific first.
#[must_use]
pub fn default_groups(cluster_name: &str, addon_name: &str) -> Vec<String> {
    vec![
        cluster_addon_group(cluster_name, addon_name),
        addon_group(addon_name),
        AUTHENTICATED_GROUP.to_string(),
    ]
}

#[cfg(test)]
#[path = "signer_tests.rs"]
mod signer_tests;

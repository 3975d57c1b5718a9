// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Registration policy of an addon agent.
//!
//! A [`RegistrationOption`] bundles the three decisions the hub makes for every agent:
//!
//! - which certificate the agent may request ([`signer`])
//! - whether a submitted CSR is auto-approved ([`approval`])
//! - which hub permissions the agent receives once approved ([`permission`])
//!
//! [`lifecycle`] tracks where one agent's registration stands.

pub mod approval;
pub mod lifecycle;
pub mod permission;
pub mod signer;

pub use approval::{CsrApprover, CsrDecision, CsrRejection, DefaultCsrApprover};
pub use lifecycle::{RegistrationEvent, RegistrationPhase};
pub use permission::{PermissionConfigurer, RbacApplier, RbacPermissionConfig};
pub use signer::{kube_client_signer_configurations, KubeClientSigner, SignerConfiguration};

use crate::crd::{ManagedCluster, ManagedClusterAddOn};
use crate::errors::PermissionError;
use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use kube::ResourceExt;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Signer, approval predicate and permission configurer of one addon.
#[derive(Clone)]
pub struct RegistrationOption {
    signer: KubeClientSigner,
    approver: Arc<dyn CsrApprover>,
    permissions: Arc<dyn PermissionConfigurer>,
}

impl fmt::Debug for RegistrationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationOption")
            .field("signer", &self.signer)
            .field("approver", &self.approver)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl RegistrationOption {
    /// Registration policy from its three parts.
    #[must_use]
    pub fn new(
        signer: KubeClientSigner,
        approver: Arc<dyn CsrApprover>,
        permissions: Arc<dyn PermissionConfigurer>,
    ) -> Self {
        Self {
            signer,
            approver,
            permissions,
        }
    }

    /// Identity strategy of the agent.
    #[must_use]
    pub fn signer(&self) -> &KubeClientSigner {
        &self.signer
    }

    /// Signer configurations an agent on `cluster` may request.
    #[must_use]
    pub fn csr_configurations(&self, cluster: &ManagedCluster) -> Vec<SignerConfiguration> {
        self.signer.configurations(&cluster.name_any())
    }

    /// Run the approval predicate on `csr`.
    #[must_use]
    pub fn evaluate_csr(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
        csr: &CertificateSigningRequest,
    ) -> CsrDecision {
        self.approver.evaluate(cluster, addon, csr)
    }

    /// Grant the agent its hub permissions.
    ///
    /// # Errors
    ///
    /// Propagates the configurer's [`PermissionError`].
    pub async fn configure_permissions(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<(), PermissionError> {
        self.permissions.configure(cluster, addon).await
    }

    /// Evaluate a newly submitted CSR and, if approved, grant permissions.
    ///
    /// Returns the phase the registration ends up in: `Rejected` if the predicate fails,
    /// `Approved` if the permission grant failed (to be retried), `PermissionsGranted`
    /// otherwise.
    pub async fn handle_csr(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
        csr: &CertificateSigningRequest,
    ) -> RegistrationPhase {
        if let CsrDecision::Rejected(reason) = self.evaluate_csr(cluster, addon, csr) {
            return RegistrationPhase::Rejected(reason);
        }

        match self.configure_permissions(cluster, addon).await {
            Ok(()) => RegistrationPhase::PermissionsGranted,
            Err(e) => {
                warn!(
                    cluster = %cluster.name_any(),
                    addon = %addon.name_any(),
                    error = %e,
                    "Failed to grant agent permissions, will retry"
                );
                RegistrationPhase::Approved
            }
        }
    }
}

/// Registration policy used by every shipped addon.
///
/// The agent name equals the addon name, CSRs go through [`DefaultCsrApprover`], and
/// permissions through `permissions`.
#[must_use]
pub fn new_registration_option(
    addon_name: &str,
    permissions: Arc<dyn PermissionConfigurer>,
) -> RegistrationOption {
    let signer = kube_client_signer_configurations(addon_name, addon_name);
    let approver = Arc::new(DefaultCsrApprover::new(signer.clone()));
    RegistrationOption::new(signer, approver, permissions)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;

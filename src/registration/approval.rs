// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! CSR approval predicate.
//!
//! The hub auto-approves an agent's certificate signing request only if every check
//! passes; any mismatch rejects it. Checks run in this order and the first failure is
//! reported:
//!
//! 1. `spec.signerName` is the addon's expected signer
//! 2. the `ManagedClusterAddOn` is the addon this approver guards
//! 3. the CSR's cluster-name and addon-name labels match the cluster and addon
//! 4. `spec.username` is an identity of the cluster (`system:open-cluster-management:<cluster>`)
//! 5. `spec.request` is a PEM `CERTIFICATE REQUEST`
//! 6. the subject common name is the expected agent user
//! 7. the subject organizations, ignoring `system:authenticated`, are exactly the
//!    cluster/addon group and the addon group

use crate::constants::{AUTHENTICATED_GROUP, IDENTITY_PREFIX, PEM_CERTIFICATE_REQUEST};
use crate::crd::{ManagedCluster, ManagedClusterAddOn};
use crate::labels::{CSR_ADDON_NAME_LABEL, CSR_CLUSTER_NAME_LABEL};
use crate::registration::signer::KubeClientSigner;
use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use kube::ResourceExt;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};
use x509_parser::prelude::{FromDer, X509CertificationRequest};

/// Why a CSR was not approved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrRejection {
    /// The CSR targets a different signer.
    #[error("signer '{actual}' does not match expected signer '{expected}'")]
    SignerMismatch {
        /// Signer the addon requires
        expected: String,
        /// Signer named in the CSR
        actual: String,
    },

    /// The approver was asked about a different addon.
    #[error("addon '{actual}' is not guarded by this approver (expected '{expected}')")]
    AddonMismatch {
        /// Addon this approver guards
        expected: String,
        /// Addon named by the `ManagedClusterAddOn`
        actual: String,
    },

    /// A routing label is missing or names another cluster/addon.
    #[error("label '{label}' is {actual:?}, expected '{expected}'")]
    LabelMismatch {
        /// Label key
        label: String,
        /// Expected value
        expected: String,
        /// Value on the CSR, if any
        actual: Option<String>,
    },

    /// The CSR was not submitted by an identity of the cluster.
    #[error("requester {actual:?} is not an identity of the cluster (expected prefix '{expected_prefix}')")]
    RequesterMismatch {
        /// Prefix every requester of the cluster carries
        expected_prefix: String,
        /// `spec.username` of the CSR, if any
        actual: Option<String>,
    },

    /// The request payload is not a parseable PEM certificate request.
    #[error("invalid certificate request: {0}")]
    InvalidRequest(String),

    /// The subject common name is not the expected agent user.
    #[error("common name {actual:?} does not match expected user '{expected}'")]
    CommonNameMismatch {
        /// Expected user
        expected: String,
        /// Common name in the request, if any
        actual: Option<String>,
    },

    /// The subject organizations are not an allowed group set.
    #[error("organizations {actual:?} do not match expected groups {expected:?}")]
    OrganizationMismatch {
        /// Groups the agent may claim
        expected: Vec<String>,
        /// Organizations in the request
        actual: Vec<String>,
    },
}

/// Outcome of evaluating one CSR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrDecision {
    /// The hub should approve the CSR.
    Approved,
    /// The hub must not approve the CSR.
    Rejected(CsrRejection),
}

impl CsrDecision {
    /// Whether the CSR should be approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Decides whether the hub auto-approves an incoming CSR.
pub trait CsrApprover: Send + Sync + fmt::Debug {
    /// Evaluate `csr`, submitted for `addon` on `cluster`.
    fn evaluate(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
        csr: &CertificateSigningRequest,
    ) -> CsrDecision;

    /// Boolean form of [`CsrApprover::evaluate`].
    fn approve(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
        csr: &CertificateSigningRequest,
    ) -> bool {
        self.evaluate(cluster, addon, csr).is_approved()
    }
}

/// Default fail-closed approver: signer and subject must match the addon's identity exactly.
#[derive(Clone, Debug)]
pub struct DefaultCsrApprover {
    signer: KubeClientSigner,
}

impl DefaultCsrApprover {
    /// Approver for CSRs issued under `signer`.
    #[must_use]
    pub fn new(signer: KubeClientSigner) -> Self {
        Self { signer }
    }

    fn check(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
        csr: &CertificateSigningRequest,
    ) -> Result<(), CsrRejection> {
        let cluster_name = cluster.name_any();
        let addon_name = addon.name_any();

        if csr.spec.signer_name != self.signer.signer_name() {
            return Err(CsrRejection::SignerMismatch {
                expected: self.signer.signer_name().to_string(),
                actual: csr.spec.signer_name.clone(),
            });
        }

        if addon_name != self.signer.addon_name() {
            return Err(CsrRejection::AddonMismatch {
                expected: self.signer.addon_name().to_string(),
                actual: addon_name,
            });
        }

        check_label(csr, CSR_CLUSTER_NAME_LABEL, &cluster_name)?;
        check_label(csr, CSR_ADDON_NAME_LABEL, &addon_name)?;
        check_requester(csr, &cluster_name)?;

        let (common_name, organizations) = parse_request_subject(&csr.spec.request.0)?;
        let expected = self.signer.expected_subject(&cluster_name);

        if common_name.as_deref() != Some(expected.user.as_str()) {
            return Err(CsrRejection::CommonNameMismatch {
                expected: expected.user,
                actual: common_name,
            });
        }

        let expected_groups = without_authenticated(&expected.groups);
        if without_authenticated(&organizations) != expected_groups {
            return Err(CsrRejection::OrganizationMismatch {
                expected: expected_groups.into_iter().map(str::to_string).collect(),
                actual: organizations,
            });
        }

        Ok(())
    }
}

impl CsrApprover for DefaultCsrApprover {
    fn evaluate(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
        csr: &CertificateSigningRequest,
    ) -> CsrDecision {
        match self.check(cluster, addon, csr) {
            Ok(()) => {
                debug!(
                    csr = %csr.name_any(),
                    cluster = %cluster.name_any(),
                    addon = %addon.name_any(),
                    "CSR matches addon identity"
                );
                CsrDecision::Approved
            }
            Err(reason) => {
                info!(
                    csr = %csr.name_any(),
                    cluster = %cluster.name_any(),
                    addon = %addon.name_any(),
                    reason = %reason,
                    "CSR approve check failed"
                );
                CsrDecision::Rejected(reason)
            }
        }
    }
}

fn check_label(
    csr: &CertificateSigningRequest,
    label: &str,
    expected: &str,
) -> Result<(), CsrRejection> {
    let actual = csr.labels().get(label);
    if actual.map(String::as_str) == Some(expected) {
        Ok(())
    } else {
        Err(CsrRejection::LabelMismatch {
            label: label.to_string(),
            expected: expected.to_string(),
            actual: actual.cloned(),
        })
    }
}

/// The requester must be the cluster's registration identity or one derived from it.
fn check_requester(csr: &CertificateSigningRequest, cluster_name: &str) -> Result<(), CsrRejection> {
    let expected_prefix = format!("{IDENTITY_PREFIX}:{cluster_name}");
    match csr.spec.username.as_deref() {
        Some(user) if user == expected_prefix || user.starts_with(&format!("{expected_prefix}:")) => {
            Ok(())
        }
        actual => Err(CsrRejection::RequesterMismatch {
            expected_prefix,
            actual: actual.map(str::to_string),
        }),
    }
}

/// Group set with `system:authenticated` removed.
fn without_authenticated(groups: &[String]) -> BTreeSet<&str> {
    groups
        .iter()
        .map(String::as_str)
        .filter(|group| *group != AUTHENTICATED_GROUP)
        .collect()
}

/// Common name and organizations of a PEM-encoded PKCS#10 request.
fn parse_request_subject(request: &[u8]) -> Result<(Option<String>, Vec<String>), CsrRejection> {
    let block = pem::parse(request)
        .map_err(|e| CsrRejection::InvalidRequest(format!("failed to parse PEM: {e}")))?;

    if block.tag() != PEM_CERTIFICATE_REQUEST {
        return Err(CsrRejection::InvalidRequest(format!(
            "PEM block type is '{}', expected '{PEM_CERTIFICATE_REQUEST}'",
            block.tag()
        )));
    }

    let (_, parsed) = X509CertificationRequest::from_der(block.contents())
        .map_err(|e| CsrRejection::InvalidRequest(format!("failed to parse request: {e}")))?;

    let subject = &parsed.certification_request_info.subject;
    let common_name = subject
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string);
    let organizations = subject
        .iter_organization()
        .filter_map(|org| org.as_str().ok())
        .map(str::to_string)
        .collect();

    Ok((common_name, organizations))
}

#[cfg(test)]
#[path = "approval_tests.rs"]
mod approval_tests;

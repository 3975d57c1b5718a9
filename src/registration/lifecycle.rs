// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Registration lifecycle of one addon agent on one cluster.
//!
//! ```text
//! Unregistered -> CsrSubmitted -> Approved -> PermissionsGranted -> Active
//!                              \-> Rejected
//! ```
//!
//! `Rejected` ends the life of one CSR; the agent may submit a new one, which restarts the
//! flow at `CsrSubmitted`. A failed permission grant leaves the registration `Approved` so
//! the grant is retried. An `Active` agent submits a new CSR when its certificate rotates.

use crate::errors::LifecycleError;
use crate::registration::approval::{CsrDecision, CsrRejection};

/// Where an agent's registration stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegistrationPhase {
    /// No CSR seen yet.
    #[default]
    Unregistered,
    /// A CSR is waiting for evaluation.
    CsrSubmitted,
    /// The CSR passed the approval predicate.
    Approved,
    /// The CSR failed the approval predicate.
    Rejected(CsrRejection),
    /// Hub permissions are in place; waiting for the signed certificate.
    PermissionsGranted,
    /// The agent holds a certificate and its permissions.
    Active,
}

/// Something that happened to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    /// The agent submitted a CSR.
    CsrSubmitted,
    /// The approval predicate ran.
    CsrEvaluated(CsrDecision),
    /// Hub permissions were applied.
    PermissionsGranted,
    /// Applying hub permissions failed.
    PermissionsFailed,
    /// The signer issued the certificate.
    CertificateIssued,
}

impl RegistrationPhase {
    /// Advance the phase by one event.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] if the event cannot happen in this
    /// phase.
    pub fn apply(self, event: RegistrationEvent) -> Result<Self, LifecycleError> {
        use RegistrationEvent as E;
        use RegistrationPhase as P;

        match (self, event) {
            (P::Unregistered | P::Rejected(_) | P::Active, E::CsrSubmitted) => Ok(P::CsrSubmitted),
            (P::CsrSubmitted, E::CsrEvaluated(CsrDecision::Approved)) => Ok(P::Approved),
            (P::CsrSubmitted, E::CsrEvaluated(CsrDecision::Rejected(reason))) => {
                Ok(P::Rejected(reason))
            }
            (P::Approved | P::PermissionsGranted, E::PermissionsGranted) => {
                Ok(P::PermissionsGranted)
            }
            (P::Approved, E::PermissionsFailed) => Ok(P::Approved),
            (P::PermissionsGranted, E::CertificateIssued) => Ok(P::Active),
            (P::Active, E::PermissionsGranted) => Ok(P::Active),
            (phase, event) => Err(LifecycleError::InvalidTransition { phase, event }),
        }
    }

    /// Whether the current CSR has reached an end state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Active)
    }

    /// Whether the agent is fully registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;

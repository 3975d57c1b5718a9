// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Error types for values resolution, addon registration and hub permission assignment.
//!
//! The taxonomy follows how far a failure reaches:
//! - [`ValuesError`] fails a single reconciliation attempt (or, for annotation decode
//!   failures, nothing at all)
//! - [`RegistrationError`] is fatal to process startup
//! - [`PermissionError`] fails a single reconciliation attempt and is retried
//! - [`LifecycleError`] reports an event that is not valid in the current registration phase

use crate::registration::lifecycle::{RegistrationEvent, RegistrationPhase};
use thiserror::Error;

/// Errors raised while resolving an addon's values document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuesError {
    /// A serialized values document could not be decoded.
    ///
    /// The two annotation resolvers treat this as non-fatal and resolve to an empty
    /// document instead.
    #[error("Failed to decode values from {source_name}: {reason}")]
    Decode {
        /// Where the document came from (annotation key, file name)
        source_name: String,
        /// Decoder message
        reason: String,
    },

    /// A strict resolver failed; the whole pipeline is aborted.
    #[error("Values resolver '{resolver}' failed: {reason}")]
    Resolver {
        /// Name of the failing resolver
        resolver: String,
        /// Specific reason for the failure
        reason: String,
    },
}

/// Errors raised while building or registering addon definitions.
///
/// All of these abort startup: the process must not run with an incomplete or ambiguous
/// addon.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The addon name was empty.
    #[error("Addon definition requires a non-empty name")]
    MissingName,

    /// No manifest bundle was supplied.
    #[error("Addon '{addon}' has no manifest bundle")]
    MissingBundle {
        /// Addon being built
        addon: String,
    },

    /// No registration policy was supplied.
    #[error("Addon '{addon}' has no registration option")]
    MissingRegistration {
        /// Addon being built
        addon: String,
    },

    /// An addon with the same name was already registered.
    #[error("Addon '{addon}' is already registered")]
    DuplicateAddon {
        /// The duplicated addon name
        addon: String,
    },
}

/// Errors raised while granting an agent its hub permissions.
///
/// Every variant is retryable by the caller; permission objects are applied so that a
/// partially applied attempt converges on the next one.
#[derive(Error, Debug)]
pub enum PermissionError {
    /// The cluster or addon object is missing data needed to build RBAC objects.
    #[error("Cannot assign permissions for addon '{addon}': {reason}")]
    InvalidInput {
        /// Addon being configured
        addon: String,
        /// Explanation of what is missing
        reason: String,
    },

    /// Applying an RBAC object to the hub failed.
    #[error("Failed to apply {kind} {namespace}/{name}: {source}")]
    Apply {
        /// Kind of the object (`Role`, `RoleBinding`)
        kind: String,
        /// Namespace of the object
        namespace: String,
        /// Name of the object
        name: String,
        /// Underlying API error
        #[source]
        source: anyhow::Error,
    },
}

/// Invalid registration lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The event cannot be applied in the current phase.
    #[error("Event {event:?} is not valid in registration phase {phase:?}")]
    InvalidTransition {
        /// Phase the registration was in
        phase: RegistrationPhase,
        /// Rejected event
        event: RegistrationEvent,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;

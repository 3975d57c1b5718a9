// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Value layer resolvers.
//!
//! Each resolver turns a `(ManagedCluster, ManagedClusterAddOn)` pair into a [`Values`]
//! document. Resolvers are pure: they read their inputs and never mutate shared state,
//! so one resolver can serve every cluster concurrently.
//!
//! # Failure Modes
//!
//! - [`ValueResolver::Defaults`] never fails.
//! - [`ValueResolver::UserAnnotation`] and [`ValueResolver::AddonAnnotation`] are
//!   best-effort: a missing, empty or malformed annotation resolves to an empty document
//!   and the decode error is only logged.
//! - [`ValueResolver::Custom`] is strict: its error aborts the pipeline.

use crate::config::AddonDefaults;
use crate::crd::{ManagedCluster, ManagedClusterAddOn};
use crate::errors::ValuesError;
use crate::labels::{ADDON_VALUES_ANNOTATION, USER_VALUES_ANNOTATION};
use crate::values::Values;
use kube::ResourceExt;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Signature of a caller-supplied resolver.
pub type ResolveFn =
    dyn Fn(&ManagedCluster, &ManagedClusterAddOn) -> Result<Values, ValuesError> + Send + Sync;

/// One layer of the values pipeline.
#[derive(Clone)]
pub enum ValueResolver {
    /// Fixed baseline document.
    Defaults(Values),

    /// Operator intent from the `user-defined` annotation.
    UserAnnotation,

    /// Administrative intent from the `addon.open-cluster-management.io/values`
    /// annotation, maintained by the klusterlet addon controller.
    AddonAnnotation,

    /// Caller-supplied resolver; failures are fatal to the pipeline run.
    Custom {
        /// Name used in logs and errors
        name: String,
        /// The resolver function
        resolve: Arc<ResolveFn>,
    },
}

impl ValueResolver {
    /// Baseline resolver for the given defaults.
    #[must_use]
    pub fn defaults(defaults: &AddonDefaults) -> Self {
        Self::Defaults(defaults.to_values())
    }

    /// Wrap a function as a strict resolver.
    pub fn custom<F>(name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&ManagedCluster, &ManagedClusterAddOn) -> Result<Values, ValuesError>
            + Send
            + Sync
            + 'static,
    {
        Self::Custom {
            name: name.into(),
            resolve: Arc::new(resolve),
        }
    }

    /// Name of this resolver, for logs and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Defaults(_) => "defaults",
            Self::UserAnnotation => "user-annotation",
            Self::AddonAnnotation => "addon-annotation",
            Self::Custom { name, .. } => name,
        }
    }

    /// Whether decode failures are swallowed instead of reported.
    #[must_use]
    pub fn is_lenient(&self) -> bool {
        matches!(self, Self::UserAnnotation | Self::AddonAnnotation)
    }

    /// Resolve this layer for one cluster.
    ///
    /// # Errors
    ///
    /// Only [`ValueResolver::Custom`] can fail.
    pub fn resolve(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<Values, ValuesError> {
        match self {
            Self::Defaults(values) => Ok(values.clone()),
            Self::UserAnnotation => Ok(from_annotation(cluster, addon, USER_VALUES_ANNOTATION)),
            Self::AddonAnnotation => Ok(from_annotation(cluster, addon, ADDON_VALUES_ANNOTATION)),
            Self::Custom { resolve, .. } => resolve(cluster, addon),
        }
    }
}

impl fmt::Debug for ValueResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults(values) => f.debug_tuple("Defaults").field(values).finish(),
            Self::UserAnnotation => f.write_str("UserAnnotation"),
            Self::AddonAnnotation => f.write_str("AddonAnnotation"),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// Lenient decode of a values annotation.
fn from_annotation(cluster: &ManagedCluster, addon: &ManagedClusterAddOn, key: &str) -> Values {
    match Values::decode(key, addon.annotation(key)) {
        Ok(values) => values,
        Err(e) => {
            warn!(
                cluster = %cluster.name_any(),
                addon = %addon.name_any(),
                annotation = key,
                error = %e,
                "Ignoring malformed values annotation"
            );
            Values::default()
        }
    }
}

#[cfg(test)]
#[path = "resolvers_tests.rs"]
mod resolvers_tests;

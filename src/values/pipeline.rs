// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Ordered composition of value resolvers.

use crate::config::AddonDefaults;
use crate::crd::{ManagedCluster, ManagedClusterAddOn};
use crate::errors::ValuesError;
use crate::values::{ValueResolver, Values};
use kube::ResourceExt;
use tracing::{debug, error};

/// An ordered list of resolvers; later layers override earlier ones.
///
/// The order is fixed when the pipeline is built and is the same for every cluster.
#[derive(Clone, Debug, Default)]
pub struct ValuePipeline {
    resolvers: Vec<ValueResolver>,
}

impl ValuePipeline {
    /// Pipeline over the given resolvers, lowest precedence first.
    #[must_use]
    pub fn new(resolvers: Vec<ValueResolver>) -> Self {
        Self { resolvers }
    }

    /// The precedence chain every shipped addon uses:
    /// defaults < `user-defined` annotation < addon values annotation.
    #[must_use]
    pub fn standard(defaults: &AddonDefaults) -> Self {
        Self::new(vec![
            ValueResolver::defaults(defaults),
            ValueResolver::UserAnnotation,
            ValueResolver::AddonAnnotation,
        ])
    }

    /// Resolvers in evaluation order.
    #[must_use]
    pub fn resolvers(&self) -> &[ValueResolver] {
        &self.resolvers
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the pipeline has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Run every resolver in order and merge their documents left to right.
    ///
    /// # Errors
    ///
    /// Returns [`ValuesError::Resolver`] naming the first resolver that failed. No partial
    /// document is returned.
    pub fn resolve(
        &self,
        cluster: &ManagedCluster,
        addon: &ManagedClusterAddOn,
    ) -> Result<Values, ValuesError> {
        let mut values = Values::new();

        for resolver in &self.resolvers {
            let layer = resolver.resolve(cluster, addon).map_err(|e| {
                error!(
                    cluster = %cluster.name_any(),
                    addon = %addon.name_any(),
                    resolver = resolver.name(),
                    error = %e,
                    "Values resolver failed, aborting pipeline"
                );
                match e {
                    ValuesError::Resolver { .. } => e,
                    ValuesError::Decode { .. } => ValuesError::Resolver {
                        resolver: resolver.name().to_string(),
                        reason: e.to_string(),
                    },
                }
            })?;

            debug!(
                cluster = %cluster.name_any(),
                addon = %addon.name_any(),
                resolver = resolver.name(),
                keys = layer.len(),
                "Merging values layer"
            );
            values.merge(layer);
        }

        Ok(values)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;

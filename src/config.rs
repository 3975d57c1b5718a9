// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Startup configuration for the baseline chart values.
//!
//! [`AddonDefaults`] is built once at startup and handed to every addon's
//! [`ValuePipeline`](crate::values::ValuePipeline). It starts from the compiled-in
//! constants and can be overridden from the environment:
//!
//! | Variable                   | Overrides                                   |
//! |----------------------------|---------------------------------------------|
//! | `GRC_IMAGE_PULL_POLICY`    | `global.imagePullPolicy`                    |
//! | `GRC_IMAGE_PULL_SECRET`    | `global.imagePullSecret`                    |
//! | `GRC_IMAGE_<COMPONENT>`    | `global.imageOverrides.<component>`         |
//!
//! `<COMPONENT>` is the upper-cased component key, e.g.
//! `GRC_IMAGE_CONFIG_POLICY_CONTROLLER` for `config_policy_controller`.

use crate::constants::{
    DEFAULT_IMAGE_OVERRIDES, DEFAULT_IMAGE_PULL_POLICY, DEFAULT_IMAGE_PULL_SECRET,
    ENV_IMAGE_PREFIX, ENV_IMAGE_PULL_POLICY, ENV_IMAGE_PULL_SECRET, PROXY_ENV_VARS,
};
use crate::values::Values;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Baseline values every addon starts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddonDefaults {
    /// Container image pull policy
    pub image_pull_policy: String,
    /// Name of the pull secret on managed clusters
    pub image_pull_secret: String,
    /// Image reference per chart component
    pub image_overrides: BTreeMap<String, String>,
    /// Node selector applied to agent pods
    pub node_selector: BTreeMap<String, String>,
    /// Proxy environment variables passed to agents
    pub proxy_config: BTreeMap<String, String>,
    /// Replaces the chart's computed full name when non-empty
    pub fullname_override: String,
}

impl Default for AddonDefaults {
    fn default() -> Self {
        Self {
            image_pull_policy: DEFAULT_IMAGE_PULL_POLICY.to_string(),
            image_pull_secret: DEFAULT_IMAGE_PULL_SECRET.to_string(),
            image_overrides: DEFAULT_IMAGE_OVERRIDES
                .iter()
                .map(|(component, image)| ((*component).to_string(), (*image).to_string()))
                .collect(),
            node_selector: BTreeMap::new(),
            proxy_config: PROXY_ENV_VARS
                .iter()
                .map(|name| ((*name).to_string(), String::new()))
                .collect(),
            fullname_override: String::new(),
        }
    }
}

impl AddonDefaults {
    /// Defaults overridden from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Defaults overridden from an explicit set of variables.
    ///
    /// Empty values are ignored so that an exported-but-blank variable does not wipe a
    /// default. Image variables for unknown components are ignored.
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        let mut defaults = Self::default();

        if let Some(policy) = vars.get(ENV_IMAGE_PULL_POLICY) {
            debug!(image_pull_policy = %policy, "Overriding image pull policy from environment");
            defaults.image_pull_policy.clone_from(policy);
        }
        if let Some(secret) = vars.get(ENV_IMAGE_PULL_SECRET) {
            debug!(image_pull_secret = %secret, "Overriding image pull secret from environment");
            defaults.image_pull_secret.clone_from(secret);
        }

        for (component, image) in &mut defaults.image_overrides {
            let var = format!("{ENV_IMAGE_PREFIX}{}", component.to_uppercase());
            if let Some(value) = vars.get(&var) {
                debug!(component = %component, image = %value, "Overriding image from environment");
                image.clone_from(value);
            }
        }

        defaults
    }

    /// Render these defaults as the baseline values document.
    #[must_use]
    pub fn to_values(&self) -> Values {
        let mut global = json!({
            "imagePullSecret": self.image_pull_secret,
            "imageOverrides": self.image_overrides,
            "nodeSelector": self.node_selector,
            "proxyConfig": self.proxy_config,
        });
        // omitted when empty so a later layer's pull policy is the only one the chart sees
        if !self.image_pull_policy.is_empty() {
            global["imagePullPolicy"] = json!(self.image_pull_policy);
        }

        Values::from_json_object(json!({
            "fullnameOverride": self.fullname_override,
            "global": global,
        }))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Manifest bundles embedded in the binary.
//!
//! Each addon ships a chart that the external templating engine renders with the resolved
//! values. The chart files are compiled in with `include_str!` so the controller image
//! carries no chart directory of its own.

use crate::constants::{CERT_CHART_DIR, IAM_CHART_DIR, POLICY_CHART_DIR};

/// Embedded chart files as `(path relative to the bundle root, content)` pairs.
pub type BundleFiles = &'static [(&'static str, &'static str)];

const POLICY_FILES: BundleFiles = &[
    (
        "Chart.yaml",
        include_str!("../manifests/charts/policy/Chart.yaml"),
    ),
    (
        "values.yaml",
        include_str!("../manifests/charts/policy/values.yaml"),
    ),
    (
        "templates/_helpers.tpl",
        include_str!("../manifests/charts/policy/templates/_helpers.tpl"),
    ),
];

const IAM_FILES: BundleFiles = &[
    (
        "Chart.yaml",
        include_str!("../manifests/charts/iam-policy-controller/Chart.yaml"),
    ),
    (
        "values.yaml",
        include_str!("../manifests/charts/iam-policy-controller/values.yaml"),
    ),
    (
        "templates/_helpers.tpl",
        include_str!("../manifests/charts/iam-policy-controller/templates/_helpers.tpl"),
    ),
];

const CERT_FILES: BundleFiles = &[
    (
        "Chart.yaml",
        include_str!("../manifests/charts/cert-policy-controller/Chart.yaml"),
    ),
    (
        "values.yaml",
        include_str!("../manifests/charts/cert-policy-controller/values.yaml"),
    ),
    (
        "templates/_helpers.tpl",
        include_str!("../manifests/charts/cert-policy-controller/templates/_helpers.tpl"),
    ),
];

/// Opaque handle to an addon's chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManifestBundle {
    root: &'static str,
    files: BundleFiles,
}

impl ManifestBundle {
    /// Bundle rooted at `root` with the given embedded files.
    #[must_use]
    pub const fn embedded(root: &'static str, files: BundleFiles) -> Self {
        Self { root, files }
    }

    /// Root path of the chart inside the bundle filesystem.
    #[must_use]
    pub fn root(&self) -> &'static str {
        self.root
    }

    /// Every file of the chart as `(relative path, content)` pairs.
    #[must_use]
    pub fn files(&self) -> BundleFiles {
        self.files
    }

    /// Content of one file, by path relative to the root.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&'static str> {
        self.files
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, content)| *content)
    }
}

/// Chart of the governance policy framework addon.
#[must_use]
pub fn policy_bundle() -> ManifestBundle {
    ManifestBundle::embedded(POLICY_CHART_DIR, POLICY_FILES)
}

/// Chart of the IAM policy controller addon.
#[must_use]
pub fn iam_bundle() -> ManifestBundle {
    ManifestBundle::embedded(IAM_CHART_DIR, IAM_FILES)
}

/// Chart of the certificate policy controller addon.
#[must_use]
pub fn cert_bundle() -> ManifestBundle {
    ManifestBundle::embedded(CERT_CHART_DIR, CERT_FILES)
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod bundle_tests;

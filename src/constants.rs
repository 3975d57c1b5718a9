// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Global constants for the governance addons.
//!
//! This module contains the addon identifiers, bundle locations, default chart values and
//! registration naming rules used throughout the codebase. Constants are organized by
//! category for easy maintenance.

// ============================================================================
// Addon Names
// ============================================================================

/// Addon name of the governance policy framework (spec sync, status sync, template sync,
/// configuration policy controller)
pub const POLICY_ADDON_NAME: &str = "policy-controller";

/// Addon name of the IAM policy controller
pub const IAM_ADDON_NAME: &str = "iam-policy-controller";

/// Addon name of the certificate policy controller
pub const CERT_ADDON_NAME: &str = "cert-policy-controller";

// ============================================================================
// Manifest Bundle Roots
// ============================================================================

/// Bundle root of the governance policy framework chart
pub const POLICY_CHART_DIR: &str = "manifests/charts/policy";

/// Bundle root of the IAM policy controller chart
pub const IAM_CHART_DIR: &str = "manifests/charts/iam-policy-controller";

/// Bundle root of the certificate policy controller chart
pub const CERT_CHART_DIR: &str = "manifests/charts/cert-policy-controller";

// ============================================================================
// Default Chart Values
// ============================================================================

/// Default image pull policy for every addon agent container
pub const DEFAULT_IMAGE_PULL_POLICY: &str = "IfNotPresent";

/// Default image pull secret copied onto managed clusters
pub const DEFAULT_IMAGE_PULL_SECRET: &str = "open-cluster-management-image-pull-credentials";

/// Default image references, keyed by the component name the charts bind to
pub const DEFAULT_IMAGE_OVERRIDES: &[(&str, &str)] = &[
    (
        "governance_policy_spec_sync",
        "quay.io/open-cluster-management/governance-policy-spec-sync:latest-dev",
    ),
    (
        "governance_policy_status_sync",
        "quay.io/open-cluster-management/governance-policy-status-sync:latest-dev",
    ),
    (
        "governance_policy_template_sync",
        "quay.io/open-cluster-management/governance-policy-template-sync:latest-dev",
    ),
    (
        "config_policy_controller",
        "quay.io/open-cluster-management/config-policy-controller:latest-dev",
    ),
    (
        "klusterlet_addon_lease_controller",
        "quay.io/open-cluster-management/klusterlet-addon-lease-controller:2.2.0",
    ),
];

/// Proxy environment variables injected into every agent, empty unless overridden
pub const PROXY_ENV_VARS: &[&str] = &["HTTP_PROXY", "HTTPS_PROXY", "NO_PROXY"];

/// Namespace agents are installed into when the addon does not name one
pub const DEFAULT_INSTALL_NAMESPACE: &str = "open-cluster-management-agent-addon";

// ============================================================================
// Configuration Environment Variables
// ============================================================================

/// Prefix of the per-component image override variables (`GRC_IMAGE_<COMPONENT>`)
pub const ENV_IMAGE_PREFIX: &str = "GRC_IMAGE_";

/// Overrides [`DEFAULT_IMAGE_PULL_POLICY`]
pub const ENV_IMAGE_PULL_POLICY: &str = "GRC_IMAGE_PULL_POLICY";

/// Overrides [`DEFAULT_IMAGE_PULL_SECRET`]
pub const ENV_IMAGE_PULL_SECRET: &str = "GRC_IMAGE_PULL_SECRET";

// ============================================================================
// Registration Constants
// ============================================================================

/// Well-known Kubernetes signer for client certificates accepted by the hub API server
pub const KUBE_APISERVER_CLIENT_SIGNER: &str = "kubernetes.io/kube-apiserver-client";

/// Prefix shared by every identity issued to addon agents
pub const IDENTITY_PREFIX: &str = "system:open-cluster-management";

/// Group every authenticated Kubernetes identity belongs to
pub const AUTHENTICATED_GROUP: &str = "system:authenticated";

/// PEM tag expected on a certificate signing request
pub const PEM_CERTIFICATE_REQUEST: &str = "CERTIFICATE REQUEST";

/// Field manager used for server-side apply of hub RBAC objects
pub const FIELD_MANAGER: &str = "grc-addon-controller";

/// API group of `ManagedClusterAddOn`
pub const ADDON_API_GROUP: &str = "addon.open-cluster-management.io";

/// API group of governance `Policy` resources
pub const POLICY_API_GROUP: &str = "policy.open-cluster-management.io";

/// API group of leases
pub const COORDINATION_API_GROUP: &str = "coordination.k8s.io";

/// API group of RBAC objects
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

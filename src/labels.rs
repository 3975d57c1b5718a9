// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Common label and annotation keys.
//!
//! This module defines the standard Kubernetes labels stamped on hub RBAC objects and the
//! Open Cluster Management annotations and labels the addon reads.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Value for `app.kubernetes.io/managed-by` on objects this controller applies
pub const MANAGED_BY_GRC_ADDON: &str = "grc-addon";

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_GRC: &str = "governance-policy-framework";

// ============================================================================
// Open Cluster Management Annotations
// ============================================================================

/// Operator-supplied values annotation on `ManagedClusterAddOn`
pub const USER_VALUES_ANNOTATION: &str = "user-defined";

/// Administrative values annotation managed by the klusterlet addon controller
pub const ADDON_VALUES_ANNOTATION: &str = "addon.open-cluster-management.io/values";

// ============================================================================
// Open Cluster Management CSR Labels
// ============================================================================

/// Label naming the managed cluster that submitted a CSR
pub const CSR_CLUSTER_NAME_LABEL: &str = "open-cluster-management.io/cluster-name";

/// Label naming the addon a CSR is for
pub const CSR_ADDON_NAME_LABEL: &str = "open-cluster-management.io/addon-name";

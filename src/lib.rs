// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! # grc-addon - Governance Policy Addons for Open Cluster Management
//!
//! Hub-side logic that configures and registers the governance (GRC) addon agents deployed
//! onto every managed cluster of a fleet.
//!
//! ## Overview
//!
//! Each addon is described by:
//!
//! - a manifest bundle (chart) shipped with the binary
//! - a layered values pipeline computing per-cluster chart values
//! - a registration policy: which certificate the agent may request, whether its CSR is
//!   auto-approved, and which hub permissions it receives
//!
//! ## Modules
//!
//! - [`values`] - Values documents, resolvers and the precedence pipeline
//! - [`registration`] - Signer configuration, CSR approval and hub RBAC assignment
//! - [`addon`] - Addon definitions and their builder
//! - [`registrar`] - The set of addons managed by the hub controller
//! - [`crd`] - `ManagedCluster` and `ManagedClusterAddOn` resource types
//! - [`config`] - Default chart values, overridable from the environment
//!
//! ## Example
//!
//! ```rust,no_run
//! use grc_addon::config::AddonDefaults;
//! use grc_addon::crd::{ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec, ManagedClusterSpec};
//! use grc_addon::registrar::default_registrar;
//! use grc_addon::registration::permission::DryRunRbacApplier;
//! use std::sync::Arc;
//!
//! let registrar = default_registrar(&AddonDefaults::default(), Arc::new(DryRunRbacApplier))?;
//! let policy = registrar.get("policy-controller").expect("registered");
//!
//! let cluster = ManagedCluster::new("cluster1", ManagedClusterSpec::default());
//! let addon = ManagedClusterAddOn::new("policy-controller", ManagedClusterAddOnSpec::default());
//! let values = policy.values(&cluster, &addon)?;
//! assert_eq!(values.get_str("global.imagePullPolicy"), Some("IfNotPresent"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod addon;
pub mod bundle;
pub mod config;
pub mod constants;
pub mod crd;
pub mod errors;
pub mod labels;
pub mod registrar;
pub mod registration;
pub mod resources;
pub mod retry;
pub mod values;

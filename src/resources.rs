// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Idempotent resource application on the hub.
//!
//! Hub RBAC objects are applied with server-side apply under a fixed field manager, so
//! re-applying the same object is a no-op and a retry after a partial failure converges.
//!
//! # Example
//!
//! ```rust,no_run
//! use grc_addon::resources::create_or_apply;
//! use k8s_openapi::api::rbac::v1::Role;
//! use kube::Client;
//! use anyhow::Result;
//!
//! async fn example(client: &Client, role: Role) -> Result<()> {
//!     create_or_apply(client, "cluster1", &role, "grc-addon-controller").await
//! }
//! ```

use crate::retry::{is_conflict, retry_api_call};
use anyhow::Result;
use kube::api::{Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use tracing::{debug, info};

/// Create a resource, or server-side apply it if it already exists.
///
/// Every API call is retried on transient errors. A create that loses a race with
/// another writer (`409`) falls back to apply.
///
/// # Errors
///
/// Returns an error if:
/// - The resource has no name in its metadata
/// - API operations fail with a permanent error, or keep failing past the retry budget
pub async fn create_or_apply<T>(
    client: &Client,
    namespace: &str,
    resource: &T,
    field_manager: &str,
) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let name = resource
        .meta()
        .name
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Resource must have a name"))?;
    let kind = T::kind(&());

    let api: Api<T> = Api::namespaced(client.clone(), namespace);

    debug!(
        namespace = %namespace,
        name = %name,
        kind = %kind,
        "Creating or updating resource with Apply strategy"
    );

    let existing = retry_api_call(
        || api.get_opt(name),
        &format!("get {kind} {namespace}/{name}"),
    )
    .await?;

    if existing.is_none() {
        let post_params = PostParams::default();
        let created = retry_api_call(
            || api.create(&post_params, resource),
            &format!("create {kind} {namespace}/{name}"),
        )
        .await;

        match created {
            Ok(_) => {
                info!("Created {} {}/{}", kind, namespace, name);
                return Ok(());
            }
            Err(e) if is_conflict(&e) => {
                debug!("{} {}/{} created concurrently, applying", kind, namespace, name);
            }
            Err(e) => return Err(e),
        }
    }

    let params = PatchParams::apply(field_manager).force();
    let patch = Patch::Apply(resource);
    retry_api_call(
        || api.patch(name, &params, &patch),
        &format!("apply {kind} {namespace}/{name}"),
    )
    .await?;
    debug!("Applied {} {}/{}", kind, namespace, name);

    Ok(())
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;

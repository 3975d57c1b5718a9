// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - argument parsing and local object construction

#[cfg(test)]
mod tests {
    use crate::{cluster_name, list_addons, local_addon, local_cluster, lookup, Cli, Command};
    use clap::Parser;
    use grc_addon::config::AddonDefaults;
    use grc_addon::registrar::default_registrar;
    use grc_addon::registration::permission::DryRunRbacApplier;
    use std::sync::Arc;

    #[test]
    fn test_parse_values_command() {
        let cli = Cli::try_parse_from([
            "grc-addon",
            "values",
            "--cluster",
            "cluster1",
            "--addon",
            "policy-controller",
            "--user-values",
            r#"{"global":{"imagePullSecret":"mySecret"}}"#,
        ])
        .unwrap();

        match cli.command {
            Command::Values {
                cluster,
                addon,
                user_values,
                addon_values,
                render_request,
                ..
            } => {
                assert_eq!(cluster, "cluster1");
                assert_eq!(addon, "policy-controller");
                assert!(user_values.is_some());
                assert!(addon_values.is_none());
                assert!(!render_request);
            }
            other => panic!("expected values command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_grant_requires_cluster() {
        assert!(Cli::try_parse_from(["grc-addon", "grant", "--addon", "policy-controller"]).is_err());
    }

    #[test]
    fn test_local_addon_sets_annotations() {
        let addon = local_addon(
            "policy-controller",
            "cluster1",
            None,
            Some("{}".to_string()),
            None,
        );

        assert_eq!(addon.metadata.namespace.as_deref(), Some("cluster1"));
        assert_eq!(addon.annotation("user-defined"), "{}");
        assert_eq!(addon.annotation("addon.open-cluster-management.io/values"), "");
        assert_eq!(addon.install_namespace(), "open-cluster-management-agent-addon");
    }

    #[test]
    fn test_local_addon_without_annotations() {
        let addon = local_addon("policy-controller", "cluster1", None, None, None);
        assert!(addon.metadata.annotations.is_none());
    }

    #[test]
    fn test_local_cluster() {
        let cluster = local_cluster("cluster1", Some("v1.30.0".to_string()));
        assert_eq!(cluster_name(&cluster), "cluster1");
        assert_eq!(cluster.kube_version(), Some("v1.30.0"));
    }

    #[test]
    fn test_lookup_and_list() {
        let registrar =
            default_registrar(&AddonDefaults::default(), Arc::new(DryRunRbacApplier)).unwrap();

        assert!(lookup(&registrar, "iam-policy-controller").is_ok());
        let err = lookup(&registrar, "search-collector").unwrap_err();
        assert!(err.to_string().contains("cert-policy-controller"));

        let listing = list_addons(&registrar);
        assert_eq!(listing.lines().count(), 3);
        assert!(listing.starts_with(
            "cert-policy-controller\tmanifests/charts/cert-policy-controller\tkubernetes.io/kube-apiserver-client"
        ));
    }
}

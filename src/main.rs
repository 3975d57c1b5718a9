// Copyright (c) 2025 Open Cluster Management GRC Squad
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grc_addon::{
    config::AddonDefaults,
    constants::FIELD_MANAGER,
    crd::{
        ManagedCluster, ManagedClusterAddOn, ManagedClusterAddOnSpec, ManagedClusterSpec,
        ManagedClusterStatus, ManagedClusterVersion,
    },
    labels::{ADDON_VALUES_ANNOTATION, USER_VALUES_ANNOTATION},
    registrar::{default_registrar, FleetRegistrar},
    registration::{
        permission::{DryRunRbacApplier, KubeRbacApplier, RbacApplier},
        CsrDecision,
    },
    retry::retry_api_call,
};
use k8s_openapi::api::certificates::v1::CertificateSigningRequest;
use kube::{Api, Client};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hub-side tooling for the governance policy addons
#[derive(Parser, Debug)]
#[command(name = "grc-addon", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered addons
    List,

    /// Resolve the values document of one addon for one cluster
    Values {
        /// Managed cluster name
        #[arg(long)]
        cluster: String,

        /// Addon name
        #[arg(long)]
        addon: String,

        /// Install namespace on the managed cluster
        #[arg(long)]
        install_namespace: Option<String>,

        /// Content of the `user-defined` annotation
        #[arg(long)]
        user_values: Option<String>,

        /// Content of the `addon.open-cluster-management.io/values` annotation
        #[arg(long)]
        addon_values: Option<String>,

        /// Kubernetes version reported by the managed cluster
        #[arg(long)]
        kube_version: Option<String>,

        /// Print the full render request instead of the values alone
        #[arg(long)]
        render_request: bool,
    },

    /// Grant an addon agent its hub permissions
    Grant {
        /// Managed cluster name
        #[arg(long)]
        cluster: String,

        /// Addon name
        #[arg(long)]
        addon: String,

        /// Log the RBAC objects instead of applying them
        #[arg(long, env = "GRC_DRY_RUN")]
        dry_run: bool,
    },

    /// Evaluate a CSR manifest against an addon's approval predicate
    CheckCsr {
        /// Managed cluster name
        #[arg(long)]
        cluster: String,

        /// Addon name
        #[arg(long)]
        addon: String,

        /// Path to a `CertificateSigningRequest` YAML manifest
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("grc-addon")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_tracing();
    debug!("Logging initialized with file and line number tracking");

    let defaults = AddonDefaults::from_env();

    match cli.command {
        Command::List => {
            let registrar = default_registrar(&defaults, Arc::new(DryRunRbacApplier))?;
            print!("{}", list_addons(&registrar));
        }
        Command::Values {
            cluster,
            addon,
            install_namespace,
            user_values,
            addon_values,
            kube_version,
            render_request,
        } => {
            let registrar = default_registrar(&defaults, Arc::new(DryRunRbacApplier))?;
            let definition = lookup(&registrar, &addon)?;
            let cluster = local_cluster(&cluster, kube_version);
            let addon = local_addon(
                &addon,
                cluster_name(&cluster),
                install_namespace,
                user_values,
                addon_values,
            );

            let output = if render_request {
                serde_yaml::to_string(&definition.render_request(&cluster, &addon)?)?
            } else {
                definition.values(&cluster, &addon)?.to_yaml()?
            };
            print!("{output}");
        }
        Command::Grant {
            cluster,
            addon,
            dry_run,
        } => {
            tokio::select! {
                result = grant(&defaults, &cluster, &addon, dry_run) => result?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, permission grant abandoned");
                    anyhow::bail!("Interrupted before permissions were granted");
                }
            }
        }
        Command::CheckCsr {
            cluster,
            addon,
            file,
        } => {
            let registrar = default_registrar(&defaults, Arc::new(DryRunRbacApplier))?;
            let definition = lookup(&registrar, &addon)?;
            let manifest = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let csr: CertificateSigningRequest = serde_yaml::from_str(&manifest)
                .with_context(|| format!("Failed to parse {} as a CSR", file.display()))?;

            let cluster = local_cluster(&cluster, None);
            let addon = local_addon(&addon, cluster_name(&cluster), None, None, None);
            match definition.registration().evaluate_csr(&cluster, &addon, &csr) {
                CsrDecision::Approved => println!("approved"),
                CsrDecision::Rejected(reason) => println!("rejected: {reason}"),
            }
        }
    }

    Ok(())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or compact text).
/// Logs go to stderr so command output on stdout stays machine readable.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Apply the agent RBAC of `addon_name` on `cluster_name`.
///
/// A dry run works on locally built objects; a real grant reads both objects from the hub
/// so owner references point at the live `ManagedClusterAddOn`.
async fn grant(
    defaults: &AddonDefaults,
    cluster_name: &str,
    addon_name: &str,
    dry_run: bool,
) -> Result<()> {
    let (applier, cluster, addon) = if dry_run {
        info!("[DRY RUN] No objects will be written to the hub");
        let applier: Arc<dyn RbacApplier> = Arc::new(DryRunRbacApplier);
        (
            applier,
            local_cluster(cluster_name, None),
            local_addon(addon_name, cluster_name, None, None, None),
        )
    } else {
        debug!("Initializing Kubernetes client");
        let client = Client::try_default().await?;

        let clusters: Api<ManagedCluster> = Api::all(client.clone());
        let cluster = retry_api_call(
            || clusters.get(cluster_name),
            &format!("get ManagedCluster {cluster_name}"),
        )
        .await?;

        let addons: Api<ManagedClusterAddOn> = Api::namespaced(client.clone(), cluster_name);
        let addon = retry_api_call(
            || addons.get(addon_name),
            &format!("get ManagedClusterAddOn {cluster_name}/{addon_name}"),
        )
        .await?;

        let applier: Arc<dyn RbacApplier> = Arc::new(KubeRbacApplier::new(client, FIELD_MANAGER));
        (applier, cluster, addon)
    };

    let registrar = default_registrar(defaults, applier)?;
    let definition = lookup(&registrar, addon_name)?;
    definition
        .registration()
        .configure_permissions(&cluster, &addon)
        .await?;

    info!(
        cluster = %cluster_name,
        addon = %addon_name,
        "Permissions granted"
    );
    Ok(())
}

fn lookup<'a>(
    registrar: &'a FleetRegistrar,
    addon_name: &str,
) -> Result<&'a Arc<grc_addon::addon::AddonDefinition>> {
    registrar.get(addon_name).with_context(|| {
        format!(
            "Unknown addon '{addon_name}', expected one of: {}",
            registrar.names().join(", ")
        )
    })
}

fn list_addons(registrar: &FleetRegistrar) -> String {
    registrar
        .agents()
        .map(|agent| {
            format!(
                "{}\t{}\t{}\n",
                agent.name(),
                agent.bundle().root(),
                agent.registration().signer().signer_name()
            )
        })
        .collect()
}

fn cluster_name(cluster: &ManagedCluster) -> &str {
    cluster.metadata.name.as_deref().unwrap_or_default()
}

fn local_cluster(name: &str, kube_version: Option<String>) -> ManagedCluster {
    let mut cluster = ManagedCluster::new(name, ManagedClusterSpec::default());
    cluster.status = Some(ManagedClusterStatus {
        version: Some(ManagedClusterVersion {
            kubernetes: kube_version,
        }),
    });
    cluster
}

fn local_addon(
    name: &str,
    cluster_name: &str,
    install_namespace: Option<String>,
    user_values: Option<String>,
    addon_values: Option<String>,
) -> ManagedClusterAddOn {
    let mut addon = ManagedClusterAddOn::new(name, ManagedClusterAddOnSpec { install_namespace });
    addon.metadata.namespace = Some(cluster_name.to_string());

    let annotations: BTreeMap<String, String> = [
        (USER_VALUES_ANNOTATION, user_values),
        (ADDON_VALUES_ANNOTATION, addon_values),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
    .collect();
    if !annotations.is_empty() {
        addon.metadata.annotations = Some(annotations);
    }
    addon
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod main_tests;

use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use tracing::info;
use vc_register_crds::ADMIN_SECRET_DATA_KEY;
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;
use vc_register_k8s_utils::update_kubeconfig_secret;

use crate::context::Context;
use crate::identity::{cluster_key, validate_cluster_key};
use crate::sanitize::CrossCluster;
use crate::store::{ObjectStore, ensure_namespace};
use crate::{Error, Result};

/// Provisions the root namespace of a VirtualCluster on the meta cluster and
/// copies the control plane's admin kubeconfig secret into it.
///
/// Not idempotent: a second run for the same VirtualCluster fails when the
/// secret copy already exists. Callers only run it on the first observation
/// of the Running phase.
#[tracing::instrument(skip(ctx, vc), fields(vc = %vc.name_any()))]
pub async fn bootstrap<T, M>(ctx: &Context<T, M>, vc: &VirtualCluster) -> Result<()>
where
    T: ObjectStore,
    M: ObjectStore,
{
    let root_ns = cluster_key(vc);
    validate_cluster_key(&root_ns)?;
    info!("initializing VirtualCluster {} on meta cluster", vc.name_any());

    let cluster_ns = vc
        .cluster_namespace()
        .ok_or_else(|| Error::MissingClusterNamespace(vc.name_any()))?;
    let secret: Secret = ctx
        .tenant
        .get(Some(cluster_ns), &ctx.settings.admin_secret_name)
        .await?;

    ensure_namespace(&ctx.meta, &root_ns).await?;

    let mut secret = secret.sanitized();
    secret.metadata.namespace = Some(root_ns.clone());
    if let Some(server) = ctx.settings.admin_server_url.as_deref() {
        secret = update_kubeconfig_secret(secret, ADMIN_SECRET_DATA_KEY, server)?;
    }
    ctx.meta.create(&secret).await?;

    info!(
        "copied secret {}/{} to root namespace {}",
        cluster_ns,
        secret.name_any(),
        root_ns
    );
    Ok(())
}

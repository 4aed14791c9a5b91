use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use tracing::{error, info};
use vc_register_crds::CLUSTER_OWNER_ANNOTATION;
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;

use crate::context::Context;
use crate::identity::cluster_key;
use crate::store::{ObjectStore, delete_if_present};
use crate::{Error, Result};

/// Deletes every meta cluster namespace annotated as belonging to `vc`.
///
/// The root namespace is named by the cluster key rather than annotated with
/// it, so it is not part of this set. Each namespace is deleted on its own;
/// failures are collected and reported together after the rest went through.
#[tracing::instrument(skip(ctx, vc), fields(vc = %vc.name_any()))]
pub async fn delete_belongings<T, M>(
    ctx: &Context<T, M>,
    vc: &VirtualCluster,
) -> Result<Vec<String>>
where
    T: ObjectStore,
    M: ObjectStore,
{
    let key = cluster_key(vc);
    let namespaces: Vec<Namespace> = ctx.meta.list(None).await?;

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for ns in namespaces.iter().filter(|ns| belongs_to(ns, &key)) {
        let name = ns.name_any();
        match delete_if_present::<Namespace, _>(&ctx.meta, None, &name).await {
            Ok(_) => {
                info!("namespace {} is deleted", name);
                deleted.push(name);
            }
            Err(e) => {
                error!(%e, "failed to delete namespace {}", name);
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        return Err(Error::PartialCascade(failed));
    }
    Ok(deleted)
}

pub fn belongs_to(ns: &Namespace, key: &str) -> bool {
    ns.annotations()
        .get(CLUSTER_OWNER_ANNOTATION)
        .is_some_and(|owner| !owner.is_empty() && owner == key)
}

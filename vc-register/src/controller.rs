use kube::Client;
use tokio_util::sync::CancellationToken;
use vc_register_controller::start_register;

use crate::cluster::{Cluster, validate_kubeconfigs};
use crate::config::RunArgs;
use crate::Result;

/// Clients for the meta and tenant clusters.
pub struct Clients {
    pub meta: Client,
    pub tenant: Client,
}

/// Builds both cluster clients from the run flags.
///
/// Any failure here is a startup error and the process should not continue.
pub async fn connect(args: &RunArgs) -> Result<Clients> {
    let (meta_path, tenant_path) = validate_kubeconfigs(
        args.meta_kubeconfig.as_deref(),
        args.tenant_kubeconfig.as_deref(),
    )?;

    let mut meta = Cluster::try_new("meta", meta_path).await?;
    let mut tenant = Cluster::try_new("tenant", Some(tenant_path)).await?;

    Ok(Clients {
        meta: meta.take_client()?,
        tenant: tenant.take_client()?,
    })
}

pub async fn start(
    args: RunArgs,
    clients: Clients,
    ready: CancellationToken,
    cancel: CancellationToken,
) -> Result<()> {
    start_register(
        clients.tenant,
        clients.meta,
        args.register_config(),
        ready,
        cancel,
    )
    .await?;
    Ok(())
}

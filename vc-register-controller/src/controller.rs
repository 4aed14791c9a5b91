use std::fmt;

use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use tracing::{info, warn};
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;
use vc_register_k8s_utils::Notification;

use crate::bootstrap::bootstrap;
use crate::cascade::delete_belongings;
use crate::context::Context;
use crate::identity::cluster_key;
use crate::sanitize::{CrossCluster, clear_uid};
use crate::store::{ObjectStore, StoreError, delete_if_present, ensure_namespace};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    TenantNamespace,
    Bootstrap,
    CreateMirror,
    FetchMirror,
    UpdateMirror,
    Belongings,
    RootNamespace,
    DeleteTenantNamespace,
    DeleteMirror,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::TenantNamespace => "tenant_namespace",
            Step::Bootstrap => "bootstrap",
            Step::CreateMirror => "create_mirror",
            Step::FetchMirror => "fetch_mirror",
            Step::UpdateMirror => "update_mirror",
            Step::Belongings => "belongings",
            Step::RootNamespace => "root_namespace",
            Step::DeleteTenantNamespace => "delete_tenant_namespace",
            Step::DeleteMirror => "delete_mirror",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handler attempted and how each step ended.
///
/// Steps are best effort and never retried, so the outcome is the only
/// record of a failure besides the log line written for it.
#[derive(Debug, Default)]
pub struct Outcome {
    steps: Vec<(Step, Result<()>)>,
    skipped: bool,
}

impl Outcome {
    fn record(&mut self, step: Step, result: Result<()>) {
        self.steps.push((step, result));
    }

    pub fn step(&self, step: Step) -> Option<&Result<()>> {
        self.steps.iter().find(|(s, _)| *s == step).map(|(_, r)| r)
    }

    pub fn attempted(&self, step: Step) -> bool {
        self.step(step).is_some()
    }

    /// Steps in the order they ran.
    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.steps.iter().map(|(s, _)| *s)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Step, &Error)> {
        self.steps
            .iter()
            .filter_map(|(s, r)| r.as_ref().err().map(|e| (*s, e)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The handler stopped early because there was nothing to act on.
    pub fn skipped(&self) -> bool {
        self.skipped
    }
}

pub async fn handle<T, M>(
    ctx: &Context<T, M>,
    notification: &Notification<VirtualCluster>,
) -> Outcome
where
    T: ObjectStore,
    M: ObjectStore,
{
    match notification {
        Notification::Added(vc) => on_add(ctx, vc).await,
        Notification::Updated { old, new } => on_update(ctx, old, new).await,
        Notification::Deleted(vc) => on_delete(ctx, vc).await,
    }
}

/// Mirrors a newly observed VirtualCluster onto the meta cluster.
///
/// A VirtualCluster that is already Running is bootstrapped before its mirror
/// is created, since consumers take the mirror's existence as a sign the
/// dependent resources are in place.
#[tracing::instrument(skip(ctx, vc), fields(vc = %vc.name_any()))]
pub async fn on_add<T, M>(ctx: &Context<T, M>, vc: &VirtualCluster) -> Outcome
where
    T: ObjectStore,
    M: ObjectStore,
{
    let mut outcome = Outcome::default();
    let Some(namespace) = vc.namespace() else {
        warn!("VirtualCluster {} has no namespace", vc.name_any());
        outcome.record(Step::CreateMirror, Err(Error::InvalidResource));
        return outcome;
    };
    info!(
        "adding VirtualCluster {}/{} to meta cluster with uid {}",
        namespace,
        vc.name_any(),
        vc.uid().unwrap_or_default()
    );

    let mut mirror = vc.sanitized();
    clear_uid(&mut mirror);

    let tenant_ns = ensure_namespace(&ctx.meta, &namespace).await;
    outcome.record(Step::TenantNamespace, tenant_ns.map_err(Error::from));

    if mirror.is_running() {
        outcome.record(Step::Bootstrap, bootstrap(ctx, &mirror).await);
    }

    match ctx.meta.create(&mirror).await {
        Ok(created) => {
            info!(
                "VirtualCluster {}/{} is created on meta cluster with uid {}",
                namespace,
                created.name_any(),
                created.uid().unwrap_or_default()
            );
            outcome.record(Step::CreateMirror, Ok(()));
        }
        Err(e) => outcome.record(Step::CreateMirror, Err(e.into())),
    }
    outcome
}

/// Carries a change of a VirtualCluster over to its mirror.
///
/// Bootstrap runs only on the Pending to Running edge. A missing mirror is
/// left missing.
#[tracing::instrument(skip(ctx, old, new), fields(vc = %new.name_any()))]
pub async fn on_update<T, M>(
    ctx: &Context<T, M>,
    old: &VirtualCluster,
    new: &VirtualCluster,
) -> Outcome
where
    T: ObjectStore,
    M: ObjectStore,
{
    let mut outcome = Outcome::default();
    let Some(namespace) = new.namespace() else {
        warn!("VirtualCluster {} has no namespace", new.name_any());
        outcome.record(Step::FetchMirror, Err(Error::InvalidResource));
        return outcome;
    };
    let name = new.name_any();
    info!("updating VirtualCluster {}/{} on meta cluster", namespace, name);

    let current: VirtualCluster = match ctx.meta.get(Some(namespace.as_str()), &name).await {
        Ok(current) => current,
        Err(StoreError::NotFound) => {
            info!(
                "VirtualCluster {}/{} is not on meta cluster, skipping update",
                namespace, name
            );
            outcome.skipped = true;
            return outcome;
        }
        Err(e) => {
            outcome.record(Step::FetchMirror, Err(e.into()));
            return outcome;
        }
    };
    outcome.record(Step::FetchMirror, Ok(()));

    let mut mirror = new.sanitized();
    clear_uid(&mut mirror);
    mirror.metadata.resource_version = current.metadata.resource_version;
    mirror.metadata.deletion_timestamp = current.metadata.deletion_timestamp;

    if old.is_pending() && new.is_running() {
        outcome.record(Step::Bootstrap, bootstrap(ctx, &mirror).await);
    }

    let updated = ctx.meta.update(&mirror).await.map(|_| ());
    outcome.record(Step::UpdateMirror, updated.map_err(Error::from));
    outcome
}

/// Removes a deleted VirtualCluster and everything depending on it from the
/// meta cluster.
///
/// The four deletions are independent: each one that fails is recorded and
/// the rest still run. Objects that are already gone count as deleted.
#[tracing::instrument(skip(ctx, vc), fields(vc = %vc.name_any()))]
pub async fn on_delete<T, M>(ctx: &Context<T, M>, vc: &VirtualCluster) -> Outcome
where
    T: ObjectStore,
    M: ObjectStore,
{
    let mut outcome = Outcome::default();
    let Some(namespace) = vc.namespace() else {
        warn!("VirtualCluster {} has no namespace", vc.name_any());
        outcome.record(Step::DeleteMirror, Err(Error::InvalidResource));
        return outcome;
    };
    let root_ns = cluster_key(vc);

    let belongings = delete_belongings(ctx, vc).await.map(|_| ());
    outcome.record(Step::Belongings, belongings);

    let root = delete_if_present::<Namespace, _>(&ctx.meta, None, &root_ns).await;
    if let Ok(true) = root {
        info!("root namespace {} is deleted", root_ns);
    }
    outcome.record(Step::RootNamespace, root.map(|_| ()).map_err(Error::from));

    let tenant = delete_if_present::<Namespace, _>(&ctx.meta, None, &namespace).await;
    if let Ok(true) = tenant {
        info!("tenant namespace {} is deleted", namespace);
    }
    outcome.record(
        Step::DeleteTenantNamespace,
        tenant.map(|_| ()).map_err(Error::from),
    );

    let name = vc.name_any();
    let removed =
        delete_if_present::<VirtualCluster, _>(&ctx.meta, Some(namespace.as_str()), &name).await;
    if removed.is_ok() {
        info!("VirtualCluster {}/{} has been removed", namespace, name);
    }
    outcome.record(Step::DeleteMirror, removed.map(|_| ()).map_err(Error::from));
    outcome
}

use std::sync::Arc;
use std::time::Duration;

use kube::{Api, Client, ResourceExt};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;
use vc_register_k8s_utils::{Informer, Notification};

use crate::context::{Context, Settings};
use crate::controller::handle;
use crate::metrics::ControllerMetrics;
use crate::store::{KubeStore, ObjectStore, StoreOptions};
use crate::{Error, Result};

const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct RegisterConfig {
    pub request_timeout: Duration,
    /// Number of workers notifications are sharded across
    pub workers: usize,
    pub admin_server_url: Option<String>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            request_timeout: crate::store::DEFAULT_REQUEST_TIMEOUT,
            workers: 1,
            admin_server_url: None,
        }
    }
}

/// Watches VirtualClusters on the tenant cluster and mirrors them onto the
/// meta cluster until `cancel` fires.
///
/// `ready` is cancelled once the informer has delivered its initial list.
pub async fn start_register(
    tenant: Client,
    meta: Client,
    config: RegisterConfig,
    ready: CancellationToken,
    cancel: CancellationToken,
) -> Result<()> {
    let options = StoreOptions {
        request_timeout: config.request_timeout,
    };
    let settings = Settings {
        admin_server_url: config.admin_server_url,
        ..Default::default()
    };
    let context = Arc::new(Context::new(
        KubeStore::new(tenant.clone(), options.clone()),
        KubeStore::new(meta, options),
        settings,
    ));
    let metrics = ControllerMetrics::new().register_global();
    let (dispatcher, workers) = Dispatcher::spawn(context, metrics, config.workers);

    let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);
    let synced = CancellationToken::new();
    let informer = Informer::new(Api::<VirtualCluster>::all(tenant));
    let informer_handle = tokio::spawn(informer.run(tx, synced.clone(), cancel));

    info!("starting VirtualCluster register with {} workers", workers.len());
    loop {
        tokio::select! {
            _ = synced.cancelled(), if !ready.is_cancelled() => {
                info!("VirtualClusters synced from tenant cluster");
                ready.cancel();
            }
            notification = rx.recv() => match notification {
                Some(notification) => dispatcher.dispatch(notification).await?,
                None => break,
            },
        }
    }

    // closing the queues lets workers finish what they already hold
    drop(dispatcher);
    for worker in workers {
        if let Err(e) = worker.await {
            error!(%e, "worker task failed");
        }
    }

    informer_handle
        .await
        .map_err(|e| Error::Task(e.to_string()))?
        .map_err(Error::from)
}

/// Routes notifications to sequential workers.
///
/// Every notification about one object lands on the same worker, so the
/// handlers for an object run in delivery order.
pub struct Dispatcher {
    shards: Vec<Sender<Notification<VirtualCluster>>>,
    hasher: ahash::RandomState,
}

impl Dispatcher {
    pub fn spawn<T, M>(
        context: Arc<Context<T, M>>,
        metrics: ControllerMetrics,
        workers: usize,
    ) -> (Self, Vec<JoinHandle<()>>)
    where
        T: ObjectStore + 'static,
        M: ObjectStore + 'static,
    {
        let mut shards = Vec::new();
        let mut handles = Vec::new();
        for id in 0..workers.max(1) {
            let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
            shards.push(tx);
            handles.push(tokio::spawn(work(
                id,
                context.clone(),
                metrics.clone(),
                rx,
            )));
        }
        let dispatcher = Self {
            shards,
            hasher: ahash::RandomState::new(),
        };
        (dispatcher, handles)
    }

    pub fn shard(&self, notification: &Notification<VirtualCluster>) -> usize {
        let vc = notification.object();
        let hash = self.hasher.hash_one((vc.namespace(), vc.name_any()));
        (hash % self.shards.len() as u64) as usize
    }

    pub async fn dispatch(&self, notification: Notification<VirtualCluster>) -> Result<()> {
        let shard = self.shard(&notification);
        self.shards[shard]
            .send(notification)
            .await
            .map_err(|_| Error::Task(format!("worker {shard} stopped")))
    }
}

async fn work<T, M>(
    id: usize,
    context: Arc<Context<T, M>>,
    metrics: ControllerMetrics,
    mut rx: Receiver<Notification<VirtualCluster>>,
) where
    T: ObjectStore,
    M: ObjectStore,
{
    while let Some(notification) = rx.recv().await {
        let kind = notification.kind();
        let vc = notification.object().clone();
        debug!("worker {} handling {} VirtualCluster {}", id, kind, vc.name_any());

        let _timer = metrics.count_and_measure(kind);
        let outcome = handle(&context, &notification).await;
        for (step, e) in outcome.failures() {
            error!(
                %e,
                step = %step,
                "failed to handle {} VirtualCluster {}/{}",
                kind,
                vc.namespace().unwrap_or_default(),
                vc.name_any()
            );
            metrics.count_failure(step, e);
        }
    }
    debug!("worker {} stopped", id);
}

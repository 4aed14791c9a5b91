use std::future::Future;
use std::time::Duration;

use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Client, ResourceExt};
use tracing::trace;

use super::{ObjectStore, StoreError, StoreObject, StoreResult};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Upper bound on every request made against the cluster
    pub request_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Object store backed by a cluster's API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    options: StoreOptions,
}

impl KubeStore {
    pub fn new(client: Client, options: StoreOptions) -> Self {
        Self { client, options }
    }

    async fn bounded<T, F>(&self, request: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.options.request_timeout, request).await {
            Ok(res) => res.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.options.request_timeout)),
        }
    }
}

impl ObjectStore for KubeStore {
    async fn get<K: StoreObject>(&self, namespace: Option<&str>, name: &str) -> StoreResult<K> {
        let api = K::api(self.client.clone(), namespace);
        trace!("get {} {:?}/{}", K::kind(&()), namespace, name);
        self.bounded(api.get(name)).await
    }

    async fn list<K: StoreObject>(&self, namespace: Option<&str>) -> StoreResult<Vec<K>> {
        let api = K::api(self.client.clone(), namespace);
        let list = self.bounded(api.list(&ListParams::default())).await?;
        Ok(list.items)
    }

    async fn create<K: StoreObject>(&self, obj: &K) -> StoreResult<K> {
        let api = K::api(self.client.clone(), obj.namespace().as_deref());
        self.bounded(api.create(&PostParams::default(), obj)).await
    }

    async fn update<K: StoreObject>(&self, obj: &K) -> StoreResult<K> {
        let api = K::api(self.client.clone(), obj.namespace().as_deref());
        let name = obj.name_any();
        self.bounded(api.replace(&name, &PostParams::default(), obj))
            .await
    }

    async fn delete<K: StoreObject>(&self, namespace: Option<&str>, name: &str) -> StoreResult<()> {
        let api = K::api(self.client.clone(), namespace);
        self.bounded(api.delete(name, &DeleteParams::default()))
            .await
            .map(|_| ())
    }
}

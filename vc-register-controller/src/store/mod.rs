mod kube_store;
#[cfg(test)]
pub(crate) mod memory;

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::ObjectMeta;
use kube::{Api, Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;

pub use kube_store::{DEFAULT_REQUEST_TIMEOUT, KubeStore, StoreOptions};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,

    #[error("object already exists")]
    AlreadyExists,

    #[error("object was modified concurrently")]
    Conflict,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("kube error: {0}")]
    KubeError(kube::Error),

    #[error("{0}")]
    Other(String),
}

impl From<kube::Error> for StoreError {
    fn from(err: kube::Error) -> Self {
        if vc_register_k8s_utils::is_not_found(&err) {
            StoreError::NotFound
        } else if vc_register_k8s_utils::is_already_exists(&err) {
            StoreError::AlreadyExists
        } else if vc_register_k8s_utils::is_conflict(&err) {
            StoreError::Conflict
        } else {
            StoreError::KubeError(err)
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// An object kind the stores know how to address.
///
/// Each kind fixes its scope here, so a store needs no runtime registry to
/// build the right request path.
pub trait StoreObject:
    Resource<DynamicType = ()>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    fn api(client: Client, namespace: Option<&str>) -> Api<Self>;
}

fn namespaced_api<K>(client: Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
{
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

impl StoreObject for Namespace {
    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl StoreObject for Secret {
    fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
        namespaced_api(client, namespace)
    }
}

impl StoreObject for VirtualCluster {
    fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
        namespaced_api(client, namespace)
    }
}

/// CRUD access to one cluster's objects.
///
/// Namespaced kinds are addressed by namespace and name, cluster scoped kinds
/// by name with `namespace` set to `None`. `update` replaces the whole object
/// and targets the resource version it carries.
pub trait ObjectStore: Send + Sync {
    fn get<K: StoreObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> impl Future<Output = StoreResult<K>> + Send;

    fn list<K: StoreObject>(
        &self,
        namespace: Option<&str>,
    ) -> impl Future<Output = StoreResult<Vec<K>>> + Send;

    fn create<K: StoreObject>(&self, obj: &K) -> impl Future<Output = StoreResult<K>> + Send;

    fn update<K: StoreObject>(&self, obj: &K) -> impl Future<Output = StoreResult<K>> + Send;

    fn delete<K: StoreObject>(
        &self,
        namespace: Option<&str>,
        name: &str,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Creates a namespace, treating an existing one as success.
pub async fn ensure_namespace<S: ObjectStore>(store: &S, name: &str) -> StoreResult<()> {
    let namespace = Namespace {
        metadata: ObjectMeta {
            name: Some(name.into()),
            ..Default::default()
        },
        ..Default::default()
    };
    match store.create(&namespace).await {
        Ok(_) | Err(StoreError::AlreadyExists) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Deletes an object, treating an absent one as success.
///
/// Returns whether the object was still there.
pub async fn delete_if_present<K, S>(
    store: &S,
    namespace: Option<&str>,
    name: &str,
) -> StoreResult<bool>
where
    K: StoreObject,
    S: ObjectStore,
{
    match store.delete::<K>(namespace, name).await {
        Ok(()) => Ok(true),
        Err(StoreError::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

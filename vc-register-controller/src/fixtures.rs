use std::collections::BTreeMap;

use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::ObjectMeta;
use vc_register_crds::v1alpha1::virtualcluster::{
    ClusterPhase, VirtualCluster, VirtualClusterSpec, VirtualClusterStatus,
};
use vc_register_crds::{ADMIN_SECRET_DATA_KEY, ADMIN_SECRET_NAME, CLUSTER_OWNER_ANNOTATION};

use crate::context::{Context, Settings};
use crate::store::memory::MemoryStore;

/// Tenant uid whose cluster key hash prefix is `ba7816`
pub const TENANT_UID: &str = "abc";
pub const CLUSTER_KEY: &str = "t1-ba7816-vc1";

pub const ADMIN_KUBECONFIG: &str = "\
apiVersion: v1
kind: Config
clusters:
- name: vc1
  cluster:
    certificate-authority-data: LS0XXX==
    server: https://apiserver-svc.t1-vc1:6443
";

pub fn make_vc(phase: Option<ClusterPhase>) -> VirtualCluster {
    let mut annotations = BTreeMap::new();
    annotations.insert("tenant-uid".to_string(), TENANT_UID.to_string());
    VirtualCluster {
        metadata: ObjectMeta {
            name: Some("vc1".into()),
            namespace: Some("t1".into()),
            annotations: Some(annotations),
            finalizers: Some(vec!["tenancy.x-k8s.io/finalizer".into()]),
            resource_version: Some("100".into()),
            uid: Some("tenant-side-uid".into()),
            ..Default::default()
        },
        spec: VirtualClusterSpec {
            cluster_version_name: Some("cv-sample-np".into()),
            ..Default::default()
        },
        status: phase.map(|phase| VirtualClusterStatus {
            phase: Some(phase),
            cluster_namespace: Some(CLUSTER_KEY.into()),
            ..Default::default()
        }),
    }
}

pub fn admin_secret(namespace: &str) -> Secret {
    let mut data = BTreeMap::new();
    data.insert(
        ADMIN_SECRET_DATA_KEY.to_string(),
        ByteString(ADMIN_KUBECONFIG.as_bytes().to_vec()),
    );
    Secret {
        metadata: ObjectMeta {
            name: Some(ADMIN_SECRET_NAME.into()),
            namespace: Some(namespace.into()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

pub fn namespace(name: &str, owner: Option<&str>) -> Namespace {
    let annotations = owner.map(|owner| {
        let mut annotations = BTreeMap::new();
        annotations.insert(CLUSTER_OWNER_ANNOTATION.to_string(), owner.to_string());
        annotations
    });
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.into()),
            annotations,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Tenant store holding the admin secret of `make_vc`, and an empty meta store.
pub fn context() -> Context<MemoryStore, MemoryStore> {
    let tenant = MemoryStore::default();
    tenant.insert(admin_secret(CLUSTER_KEY));
    Context::new(tenant, MemoryStore::default(), Settings::default())
}

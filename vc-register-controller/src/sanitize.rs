use k8s_openapi::api::core::v1::Secret;
use kube::Resource;
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;

/// Objects that can be copied from one cluster into another.
pub trait CrossCluster: Resource + Clone {
    /// Returns a copy without the source store's version token.
    ///
    /// The uid is kept; callers creating a fresh object clear it with
    /// [`clear_uid`].
    fn sanitized(&self) -> Self {
        let mut obj = self.clone();
        obj.meta_mut().resource_version = None;
        obj
    }
}

impl CrossCluster for Secret {}

impl CrossCluster for VirtualCluster {
    /// Also drops finalizers: the mirror must never take part in the source
    /// cluster's deletion ordering.
    fn sanitized(&self) -> Self {
        let mut vc = self.clone();
        vc.metadata.resource_version = None;
        vc.metadata.finalizers = None;
        vc
    }
}

pub fn clear_uid<K: Resource>(obj: &mut K) {
    obj.meta_mut().uid = None;
}

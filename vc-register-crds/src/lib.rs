use thiserror::Error;

pub mod v1alpha1;

use kube::CustomResourceExt;

/// Annotation on a VirtualCluster carrying the opaque tenant identifier
pub const TENANT_UID_ANNOTATION: &str = "tenant-uid";

/// Annotation on meta cluster namespaces naming the cluster key that owns them
pub const CLUSTER_OWNER_ANNOTATION: &str = "tenancy.x-k8s.io/cluster";

/// Secret holding the admin kubeconfig of a VirtualCluster control plane
pub const ADMIN_SECRET_NAME: &str = "admin-kubeconfig";

/// Key inside the admin secret's data holding the kubeconfig bytes
pub const ADMIN_SECRET_DATA_KEY: &str = "admin-kubeconfig";

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Prints the VirtualCluster CRD for the meta cluster.
///
/// The status subresource is dropped: mirrors are written with plain
/// create/replace calls and their status has to land with the object.
pub fn crd_gen_virtualcluster() -> Result<()> {
    print!("---\n{}", serde_yaml::to_string(&virtualcluster_crd())?);
    Ok(())
}

pub fn virtualcluster_crd()
-> k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition {
    let mut crd = v1alpha1::virtualcluster::VirtualCluster::crd();
    for version in crd.spec.versions.iter_mut() {
        version.subresources = None;
    }
    crd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crd_has_no_status_subresource() {
        let crd = virtualcluster_crd();
        assert_eq!(crd.spec.group, "tenancy.x-k8s.io");
        assert_eq!(crd.spec.names.kind, "VirtualCluster");
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some(v1alpha1::virtualcluster::NAME_GROUP_VIRTUALCLUSTER)
        );
        assert!(crd.spec.versions.iter().all(|v| v.subresources.is_none()));
    }
}

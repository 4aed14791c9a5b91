use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("kube error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("kubeconfig error: {0}")]
    KubeConfig(#[from] kube::config::KubeconfigError),

    #[error("in-cluster config error: {0}")]
    InClusterConfig(#[from] kube::config::InClusterError),

    #[error("controller error: {0}")]
    ControllerError(#[from] vc_register_controller::Error),

    #[error("crd error: {0}")]
    CrdError(#[from] vc_register_crds::Error),

    #[error("tenant cluster kubeconfig is required")]
    MissingTenantKubeconfig,

    #[error("meta and tenant cluster share the kubeconfig {}", .0.display())]
    SameKubeconfig(PathBuf),

    #[error("{0}")]
    Other(String),
}

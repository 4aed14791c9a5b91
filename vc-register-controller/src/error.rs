use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("utils error: {0}")]
    UtilsError(#[from] vc_register_k8s_utils::Error),

    #[error("invalid resource reconciled")]
    InvalidResource,

    #[error("cluster key {0} is not a valid namespace name")]
    InvalidClusterKey(String),

    #[error("VirtualCluster {0} has no cluster namespace in its status")]
    MissingClusterNamespace(String),

    #[error("failed to delete namespaces: {}", .0.join(", "))]
    PartialCascade(Vec<String>),

    #[error("task failed: {0}")]
    Task(String),
}

impl Error {
    pub fn metric_label(&self) -> String {
        match self {
            Error::Store(StoreError::NotFound) => "not_found",
            Error::Store(StoreError::AlreadyExists) => "already_exists",
            Error::Store(StoreError::Conflict) => "conflict",
            Error::Store(StoreError::Timeout(_)) => "timeout",
            Error::Store(_) => "store",
            Error::UtilsError(_) => "utils",
            Error::InvalidResource => "invalid_resource",
            Error::InvalidClusterKey(_) => "invalid_cluster_key",
            Error::MissingClusterNamespace(_) => "missing_cluster_namespace",
            Error::PartialCascade(_) => "partial_cascade",
            Error::Task(_) => "task",
        }
        .into()
    }
}

mod informer;
mod kubeconfig;

use thiserror::Error;

pub use informer::{Informer, Notification, NotificationTranslator};
pub use kubeconfig::{rewrite_kubeconfig_server, update_kubeconfig_secret};

#[derive(Error, Debug)]
pub enum Error {
    #[error("kube error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    #[error("secret {secret} has no data under key {key}")]
    MissingSecretData { secret: String, key: String },

    #[error("kube stream failed")]
    KubeStreamFailed,

    #[error("notification receiver has been dropped")]
    ChannelClosed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists")
}

pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 409 && ae.reason == "Conflict")
}

use vc_register_crds::ADMIN_SECRET_NAME;

use crate::store::ObjectStore;

pub struct Context<T, M>
where
    T: ObjectStore,
    M: ObjectStore,
{
    /// Cluster hosting the tenant control planes; only read from
    pub tenant: T,
    /// Cluster receiving the mirrored VirtualClusters
    pub meta: M,
    pub settings: Settings,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the secret holding the control plane's admin kubeconfig
    pub admin_secret_name: String,
    /// Server URL written into the copied admin kubeconfig, if set
    pub admin_server_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            admin_secret_name: ADMIN_SECRET_NAME.into(),
            admin_server_url: None,
        }
    }
}

impl<T, M> Context<T, M>
where
    T: ObjectStore,
    M: ObjectStore,
{
    pub fn new(tenant: T, meta: M, settings: Settings) -> Self {
        Self {
            tenant,
            meta,
            settings,
        }
    }
}

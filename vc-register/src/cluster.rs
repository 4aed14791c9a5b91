use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::info;

use crate::{Error, Result};

/// A connection to one of the two clusters the register works across.
pub struct Cluster {
    pub name: String,
    client: Option<kube::Client>,
}

impl Cluster {
    /// Connects with the kubeconfig at `kubeconfig`, or the in-cluster
    /// service account when there is none.
    pub async fn try_new(name: &str, kubeconfig: Option<&Path>) -> Result<Self> {
        let client_config = match kubeconfig {
            Some(path) => {
                info!("connecting to {} cluster with {}", name, path.display());
                let kubeconfig = Kubeconfig::read_from(path)?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await?
            }
            None => {
                info!("connecting to {} cluster with in-cluster config", name);
                kube::Config::incluster()?
            }
        };

        let client = kube::Client::try_from(client_config)?;
        Ok(Self {
            name: name.into(),
            client: Some(client),
        })
    }

    pub fn take_client(&mut self) -> Result<kube::Client> {
        self.client
            .take()
            .ok_or_else(|| Error::Other(format!("{} cluster client already taken", self.name)))
    }
}

/// Checks the kubeconfig paths before any connection is made.
///
/// An empty path counts as unset. Returns the meta and tenant paths.
pub fn validate_kubeconfigs<'a>(
    meta: Option<&'a Path>,
    tenant: Option<&'a Path>,
) -> Result<(Option<&'a Path>, &'a Path)> {
    let meta = meta.filter(|p| !p.as_os_str().is_empty());
    let Some(tenant) = tenant.filter(|p| !p.as_os_str().is_empty()) else {
        return Err(Error::MissingTenantKubeconfig);
    };
    if meta == Some(tenant) {
        return Err(Error::SameKubeconfig(tenant.to_path_buf()));
    }
    Ok((meta, tenant))
}

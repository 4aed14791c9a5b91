use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use serde_yaml::Value;

use crate::{Error, Result};

/// Points the first cluster entry of a kubeconfig at `server`.
///
/// The CA bundle is dropped and TLS verification disabled because the new
/// address is not covered by the control plane's serving certificate. All
/// other keys are kept as they are.
pub fn rewrite_kubeconfig_server(kubeconfig: &[u8], server: &str) -> Result<Vec<u8>> {
    let mut doc: Value = serde_yaml::from_slice(kubeconfig)?;
    let cluster = doc
        .get_mut("clusters")
        .and_then(Value::as_sequence_mut)
        .and_then(|clusters| clusters.first_mut())
        .and_then(|entry| entry.get_mut("cluster"))
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| Error::InvalidKubeconfig("no cluster entry found".into()))?;

    cluster.insert("server".into(), server.into());
    cluster.remove("certificate-authority-data");
    cluster.insert("insecure-skip-tls-verify".into(), true.into());

    Ok(serde_yaml::to_string(&doc)?.into_bytes())
}

/// Rewrites the kubeconfig stored under `key` in a secret's data.
pub fn update_kubeconfig_secret(mut secret: Secret, key: &str, server: &str) -> Result<Secret> {
    let name = secret.name_any();
    let data = secret
        .data
        .as_mut()
        .and_then(|data| data.get_mut(key))
        .ok_or_else(|| Error::MissingSecretData {
            secret: name,
            key: key.into(),
        })?;
    data.0 = rewrite_kubeconfig_server(&data.0, server)?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::ByteString;
    use kube::api::ObjectMeta;

    use super::*;

    const ADMIN_KUBECONFIG: &str = r#"
kind: Config
apiVersion: v1
users:
- name: admin
  user:
    client-certificate-data: LS0XXX==
    client-key-data: LS0XXX==
clusters:
- name: vc1
  cluster:
    certificate-authority-data: LS0XXX==
    server: https://apiserver-svc.t1-vc1:6443
contexts:
- context:
    cluster: vc1
    user: admin
  name: default
current-context: default
preferences: {}
"#;

    const REWRITTEN_KUBECONFIG: &str = r#"
kind: Config
apiVersion: v1
users:
- name: admin
  user:
    client-certificate-data: LS0XXX==
    client-key-data: LS0XXX==
clusters:
- name: vc1
  cluster:
    server: https://127.0.0.1:31256
    insecure-skip-tls-verify: true
contexts:
- context:
    cluster: vc1
    user: admin
  name: default
current-context: default
preferences: {}
"#;

    fn yaml(raw: &[u8]) -> Value {
        serde_yaml::from_slice(raw).expect("valid yaml")
    }

    #[test]
    fn test_rewrite_kubeconfig_server() {
        let out = rewrite_kubeconfig_server(ADMIN_KUBECONFIG.as_bytes(), "https://127.0.0.1:31256")
            .expect("rewrite");
        assert_eq!(yaml(&out), yaml(REWRITTEN_KUBECONFIG.as_bytes()));
    }

    #[test]
    fn test_rewrite_without_clusters_fails() {
        let err = rewrite_kubeconfig_server(b"kind: Config\nusers: []\n", "https://10.0.0.1:6443")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKubeconfig(_)));
    }

    #[test]
    fn test_update_kubeconfig_secret() {
        let mut data = BTreeMap::new();
        data.insert(
            "admin-kubeconfig".to_string(),
            ByteString(ADMIN_KUBECONFIG.as_bytes().to_vec()),
        );
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("admin-kubeconfig".into()),
                namespace: Some("t1-abc123-vc1".into()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        };

        let secret = update_kubeconfig_secret(secret, "admin-kubeconfig", "https://127.0.0.1:31256")
            .expect("update");
        let raw = &secret.data.as_ref().unwrap()["admin-kubeconfig"].0;
        assert_eq!(yaml(raw), yaml(REWRITTEN_KUBECONFIG.as_bytes()));
    }

    #[test]
    fn test_update_kubeconfig_secret_missing_key() {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("admin-kubeconfig".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = update_kubeconfig_secret(secret, "admin-kubeconfig", "https://127.0.0.1:31256")
            .unwrap_err();
        assert!(matches!(err, Error::MissingSecretData { .. }));
    }
}

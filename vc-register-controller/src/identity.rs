use kube::ResourceExt;
use sha2::{Digest, Sha256};
use vc_register_crds::TENANT_UID_ANNOTATION;
use vc_register_crds::v1alpha1::virtualcluster::VirtualCluster;

use crate::{Error, Result};

const HASH_PREFIX_LEN: usize = 6;
const MAX_NAMESPACE_LEN: usize = 63;

/// Derives the key a VirtualCluster is known by on the meta cluster.
///
/// `<namespace>-<first 6 hex chars of sha256(tenant-uid)>-<name>`. A missing
/// `tenant-uid` annotation hashes the empty string.
pub fn cluster_key(vc: &VirtualCluster) -> String {
    let tenant_uid = vc
        .annotations()
        .get(TENANT_UID_ANNOTATION)
        .map(String::as_str)
        .unwrap_or_default();
    let digest = format!("{:x}", Sha256::digest(tenant_uid.as_bytes()));
    format!(
        "{}-{}-{}",
        vc.namespace().unwrap_or_default(),
        &digest[..HASH_PREFIX_LEN],
        vc.name_any()
    )
}

/// Checks a cluster key can be used as a namespace name (RFC 1123 label).
pub fn validate_cluster_key(key: &str) -> Result<()> {
    let valid_chars = key
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    let alnum_ends = key
        .bytes()
        .next()
        .zip(key.bytes().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if key.len() > MAX_NAMESPACE_LEN || !valid_chars || !alnum_ends {
        return Err(Error::InvalidClusterKey(key.into()));
    }
    Ok(())
}

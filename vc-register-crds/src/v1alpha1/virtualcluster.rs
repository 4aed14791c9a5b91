use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::CustomResource;
use kube::KubeSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const NAME_GROUP_VIRTUALCLUSTER: &str = "virtualclusters.tenancy.x-k8s.io";

#[derive(
    CustomResource, KubeSchema, Serialize, Deserialize, Default, PartialEq, Eq, Clone, Debug,
)]
#[kube(
    group = "tenancy.x-k8s.io",
    version = "v1alpha1",
    kind = "VirtualCluster",
    shortname = "vc",
    status = "VirtualClusterStatus",
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    derive = "Default",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_domain: Option<String>,

    /// Name of the ClusterVersion the control plane is built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_version_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pki_expire_days: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transparent_meta_prefixes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opaque_meta_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualClusterStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub phase: Option<ClusterPhase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Namespace on the hosting cluster that holds the control plane and its secrets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ClusterCondition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCondition {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub last_heartbeat_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub last_transition_time: Option<Time>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Lifecycle phase reported by the hosting cluster.
///
/// Phases other than `Pending` and `Running` are carried through verbatim so
/// the mirror never rewrites a value it does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClusterPhase {
    Pending,
    Running,
    Other(String),
}

impl From<String> for ClusterPhase {
    fn from(phase: String) -> Self {
        match phase.as_str() {
            "Pending" => ClusterPhase::Pending,
            "Running" => ClusterPhase::Running,
            _ => ClusterPhase::Other(phase),
        }
    }
}

impl From<ClusterPhase> for String {
    fn from(phase: ClusterPhase) -> Self {
        match phase {
            ClusterPhase::Pending => "Pending".into(),
            ClusterPhase::Running => "Running".into(),
            ClusterPhase::Other(p) => p,
        }
    }
}

impl fmt::Display for ClusterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterPhase::Pending => f.write_str("Pending"),
            ClusterPhase::Running => f.write_str("Running"),
            ClusterPhase::Other(p) => f.write_str(p),
        }
    }
}

impl VirtualCluster {
    pub fn phase(&self) -> Option<&ClusterPhase> {
        self.status.as_ref()?.phase.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == Some(&ClusterPhase::Running)
    }

    pub fn is_pending(&self) -> bool {
        self.phase() == Some(&ClusterPhase::Pending)
    }

    pub fn cluster_namespace(&self) -> Option<&str> {
        self.status.as_ref()?.cluster_namespace.as_deref()
    }
}

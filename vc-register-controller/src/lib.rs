mod bootstrap;
mod cascade;
mod context;
pub mod controller;
mod error;
#[cfg(test)]
mod fixtures;
mod identity;
pub mod metrics;
mod runtime;
mod sanitize;
pub mod store;

pub use bootstrap::bootstrap;
pub use cascade::{belongs_to, delete_belongings};
pub use context::{Context, Settings};
pub use controller::{Outcome, Step, handle, on_add, on_delete, on_update};
pub use error::Error;
pub use identity::{cluster_key, validate_cluster_key};
pub use runtime::{Dispatcher, RegisterConfig, start_register};
pub use sanitize::{CrossCluster, clear_uid};
pub use vc_register_crds::v1alpha1;

pub type Result<T> = std::result::Result<T, Error>;

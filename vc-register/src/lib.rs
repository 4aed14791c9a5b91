pub mod cluster;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

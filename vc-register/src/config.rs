use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use vc_register_controller::RegisterConfig;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand, Debug)]
pub enum Commands {
    /// Mirror VirtualClusters from the tenant cluster onto the meta cluster
    Run(RunArgs),
    /// Print the VirtualCluster CRD
    Crdgen,
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Kubeconfig of the meta cluster, in-cluster config when unset
    #[arg(long, env = "META_KUBECONFIG")]
    pub meta_kubeconfig: Option<PathBuf>,

    /// Kubeconfig of the tenant cluster hosting the VirtualClusters
    #[arg(long, env = "TENANT_KUBECONFIG")]
    pub tenant_kubeconfig: Option<PathBuf>,

    /// Timeout applied to every request against either cluster
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Number of workers handling VirtualCluster notifications
    #[arg(long, env = "WORKERS", default_value_t = 1)]
    pub workers: usize,

    /// Server URL written into the copied admin kubeconfig
    #[arg(long, env = "ADMIN_SERVER_URL")]
    pub admin_server_url: Option<String>,

    /// Metrics listener for the controller
    #[arg(long, default_value = "0.0.0.0:9090")]
    pub metrics_address: SocketAddr,
}

impl RunArgs {
    pub fn register_config(&self) -> RegisterConfig {
        RegisterConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            workers: self.workers,
            admin_server_url: self.admin_server_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let argv = ["vc-register", "run"].iter().chain(args).copied();
        let cli = Cli::try_parse_from(argv).expect("parse");
        match cli.command {
            Commands::Run(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let args = run_args(&["--tenant-kubeconfig", "/etc/tenant/kubeconfig"]);
        assert_eq!(
            args.tenant_kubeconfig,
            Some(PathBuf::from("/etc/tenant/kubeconfig"))
        );
        assert_eq!(args.metrics_address, "0.0.0.0:9090".parse().expect("addr"));

        let config = args.register_config();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.workers, 1);
        assert_eq!(config.admin_server_url, None);
    }

    #[test]
    fn test_run_flags() {
        let args = run_args(&[
            "--tenant-kubeconfig",
            "/tenant",
            "--meta-kubeconfig",
            "/meta",
            "--request-timeout-secs",
            "5",
            "--workers",
            "4",
            "--admin-server-url",
            "https://127.0.0.1:31256",
        ]);
        assert_eq!(args.meta_kubeconfig, Some(PathBuf::from("/meta")));

        let config = args.register_config();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.workers, 4);
        assert_eq!(
            config.admin_server_url.as_deref(),
            Some("https://127.0.0.1:31256")
        );
    }

    #[test]
    fn test_crdgen() {
        let cli = Cli::try_parse_from(["vc-register", "crdgen"]).expect("parse");
        assert!(matches!(cli.command, Commands::Crdgen));
    }
}

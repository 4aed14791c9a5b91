use clap::Parser;
use tokio::task::JoinError;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vc_register::config::{Cli, Commands};
use vc_register::{Error, Result, controller, http};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_subscriber();
    let cancel = tokio_util::sync::CancellationToken::new();
    let ready = tokio_util::sync::CancellationToken::new();
    match cli.command {
        Commands::Run(run_args) => {
            let clients = controller::connect(&run_args).await?;

            let mut metrics_handle = tokio::spawn(http::serve_metrics(
                run_args.metrics_address,
                ready.child_token(),
                cancel.child_token(),
            ));
            let mut controller_handle = tokio::spawn(controller::start(
                run_args,
                clients,
                ready,
                cancel.child_token(),
            ));
            let mut shutdown_handle = tokio::spawn(async move { shutdown_signal().await });
            // watch for shutdown and errors
            let res = tokio::select! {
                h = &mut metrics_handle => exit("metrics", h),
                h = &mut controller_handle => exit("controller", h),
                _ = &mut shutdown_handle => {
                        cancel.cancel();
                        let (metrics, controller) = tokio::join!(metrics_handle, controller_handle);
                        exit("metrics", metrics).and(exit("controller", controller))
                    },
            };
            cancel.cancel();
            info!("Exiting...");
            res?;
        }
        Commands::Crdgen => vc_register_crds::crd_gen_virtualcluster()?,
    }
    Ok(())
}

fn setup_subscriber() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vc_register=info,vc_register_controller=info,vc_register_k8s_utils=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(%e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(%e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = ctrl_c => {
          info!("captured ctrl_c signal");
        },
        _ = terminate => {
          info!("captured terminate signal");
        },
    }
}

fn exit(task: &str, out: Result<Result<()>, JoinError>) -> Result<()> {
    match out {
        Ok(Ok(_)) => {
            info!("{task} exited");
            Ok(())
        }
        Ok(Err(e)) => {
            error!("{task} failed with error: {e}");
            Err(e)
        }
        Err(e) => {
            error!("{task} task failed to complete: {e}");
            Err(Error::Other(e.to_string()))
        }
    }
}

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use s3driver_api::{ApiState, driver_router};
use s3driver_lifecycle::LifecycleSys;
use s3driver_storage::{
    AwsClientConfig, AwsClientFactory, MemoryClientFactory, traits::BucketClientFactory,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, LogFormat, StorageKind};

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .with_context(|| format!("invalid log level {:?}", cli.log_level))?;

    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init(),
    }
    Ok(())
}

fn bucket_clients(cli: &Cli) -> Arc<dyn BucketClientFactory> {
    match cli.storage {
        StorageKind::Aws => Arc::new(AwsClientFactory::new(AwsClientConfig {
            endpoint: cli.s3_endpoint.clone(),
            bucket_wait: cli.bucket_wait(),
        })),
        StorageKind::Memory => {
            warn!("using in-memory storage, buckets are lost on restart");
            Arc::new(MemoryClientFactory::default())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let lifecycle = Arc::new(LifecycleSys::new(bucket_clients(&cli)));
    let state = ApiState::new(lifecycle, cli.spec_path.clone());
    let app = driver_router(state, cli.request_timeout());

    let addr = cli.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(storage = ?cli.storage, "s3driver listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

use std::{future::Future, net::SocketAddr, time::Duration};

use anyhow::anyhow;
use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use configs::{AppConfig, StorageConfig, TlsConfig};
use service::storage::{check_store::remove_store_file, FileCheckStore};
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

/// Open the check store described by `storage`, wiping it first when `reset_on_start` is set.
pub async fn build_state(storage: &StorageConfig) -> Result<ServerState, StartupError> {
    storage.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    if storage.reset_on_start {
        warn!(path = %storage.repo_path, "reset_on_start set; discarding persisted checks");
        remove_store_file(&storage.repo_path).await?;
    }
    let store = FileCheckStore::open(&storage.repo_path).await?;
    let count = store.len().await;
    info!(path = %store.path().display(), checks = count, "check store ready");
    Ok(ServerState::new(store))
}

/// Public entry: build the app and serve until SIGINT/SIGTERM
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg.storage).await?;
    let app = routes::build_router(state);

    let addr = cfg.server.bind_addr();
    let grace = cfg.server.shutdown_grace();
    match &cfg.server.tls {
        Some(tls) => {
            let rustls = load_tls(tls).await?;
            let addr = tokio::net::lookup_host(&addr)
                .await?
                .next()
                .ok_or_else(|| anyhow!("{addr} does not resolve to a socket address"))?;
            info!(%addr, cert = %tls.cert_path, "listening (https)");
            serve_tls(addr, app, rustls, shutdown_signal(), grace).await?;
        }
        None => {
            let listener = TcpListener::bind(&addr).await?;
            info!(%addr, "listening");
            serve(listener, app, shutdown_signal(), grace).await?;
        }
    }
    info!("server stopped");
    Ok(())
}

/// Serve `app` until `signal` resolves, then give in-flight requests `grace` to finish.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F, grace: Duration) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        signal.await;
        let _ = draining_tx.send(());
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        res = &mut server => return Ok(res??),
        _ = draining_rx => {}
    }

    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => Ok(res??),
        Err(_) => {
            warn!(grace_secs = grace.as_secs(), "grace period elapsed; dropping in-flight requests");
            server.abort();
            Ok(())
        }
    }
}

/// Read the PEM certificate chain and private key named by `tls`.
pub async fn load_tls(tls: &TlsConfig) -> Result<RustlsConfig, StartupError> {
    tls.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(|e| StartupError::Tls(format!("{} / {}: {}", tls.cert_path, tls.key_path, e)))
}

/// HTTPS counterpart of [`serve`]; `grace` bounds the drain after `signal`.
pub async fn serve_tls<F>(addr: SocketAddr, app: Router, tls: RustlsConfig, signal: F, grace: Duration) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        signal.await;
        shutdown.graceful_shutdown(Some(grace));
    });
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

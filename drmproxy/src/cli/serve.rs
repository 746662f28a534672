use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::{signal, sync::watch};

use crate::server::{AppState, router, run_server};

use super::ProviderArgs;

#[derive(Parser, Debug)]
pub struct ServeCommand {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// HTTP server port
    #[arg(short, long, env = "DRM_PROXY_PORT", default_value = "7777")]
    pub port: u16,

    /// First path segment of the key route
    #[arg(long, env = "DRM_PROXY_ROUTE_PREFIX", default_value = "fairplay")]
    pub route_prefix: String,

    /// Server-side limit in seconds for handling one request
    #[arg(long, env = "DRM_PROXY_REQUEST_TIMEOUT", default_value = "15")]
    pub request_timeout: u64,
}

impl ServeCommand {
    pub async fn run(self) -> Result<()> {
        let route_prefix = self.route_prefix.trim_matches('/');
        if route_prefix.is_empty() || route_prefix.contains('/') {
            bail!("route prefix must be a single path segment, got {:?}", self.route_prefix);
        }

        check_timeouts(self.request_timeout, self.provider.upstream_timeout)?;

        let key_service = self.provider.key_service()?;
        tracing::info!(
            endpoint = %self.provider.endpoint,
            profile = %key_service.profile(),
            "key service ready"
        );

        let state = AppState {
            key_service: Arc::new(key_service),
        };
        let app = router(
            state,
            route_prefix,
            Duration::from_secs(self.request_timeout),
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        tracing::info!("listening on http://{addr}/{route_prefix}/{{contentID}}/{{keyID}}");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_handle = tokio::spawn(run_server(listener, app, shutdown_rx));

        wait_for_shutdown(server_handle, shutdown_tx, signal::ctrl_c()).await
    }
}

/**
    Run until `stop` resolves, then shut the server down gracefully. A server
    that ends on its own is an error, even if it ended cleanly.
*/
async fn wait_for_shutdown(
    mut server_handle: JoinHandle<io::Result<()>>,
    shutdown_tx: watch::Sender<bool>,
    stop: impl Future<Output = io::Result<()>>,
) -> Result<()> {
    tokio::select! {
        res = stop => res?,
        res = &mut server_handle => {
            res?.context("server failed")?;
            bail!("server stopped unexpectedly");
        }
    }

    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);
    server_handle.await?.context("server failed")?;

    Ok(())
}

/// The request timeout has to outlast the provider call.
fn check_timeouts(request: u64, upstream: u64) -> Result<()> {
    if request == 0 || upstream == 0 {
        bail!("timeouts must be positive (request {request}s, upstream {upstream}s)");
    }
    if request <= upstream {
        bail!("request timeout ({request}s) must exceed the upstream timeout ({upstream}s)");
    }
    Ok(())
}

pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::StatusCode, routing::get};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;

use crate::keys::KeyService;

#[derive(Clone)]
pub struct AppState {
    pub key_service: Arc<dyn KeyService>,
}

/**
    Build the gateway router. Key lookups are served under
    `/{route_prefix}/{content_id}/{key_id}`. A request still running after
    `request_timeout` is answered with a 500, like every other failure.
*/
pub fn router(state: AppState, route_prefix: &str, request_timeout: Duration) -> Router {
    let key_route = format!("/{}/{{*path}}", route_prefix.trim_matches('/'));

    Router::new()
        .route("/healthz", get(routes::healthz))
        .route(&key_route, get(routes::content_key))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            request_timeout,
        ))
        .with_state(state)
}

/**
    Run the HTTP server until the shutdown signal flips to `true`.
*/
pub async fn run_server(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow_and_update() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
}

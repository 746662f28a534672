use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use drm_cpix::AssetKeyRequest;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::keys::KeyServiceError;

use super::AppState;

/**
    Everything that can go wrong while answering a key request. All of it
    is reported to the caller as a 500 with the error text as body.
*/
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    #[error("path {0:?} does not end in /{{contentID}}/{{keyID}}")]
    MissingIdentifiers(String),

    #[error(transparent)]
    KeyService(#[from] KeyServiceError),

    #[error("encoding response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/**
    Split the path below the route prefix into `(content_id, key_id)`: the
    last two non-empty segments.
*/
pub fn asset_key_request(path: &str) -> Result<AssetKeyRequest, RouteError> {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next()) {
        (Some(key_id), Some(content_id)) => Ok(AssetKeyRequest::new(content_id, key_id)),
        _ => Err(RouteError::MissingIdentifiers(path.to_owned())),
    }
}

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}

/**
    Key lookup endpoint: `GET /{prefix}/{content_id}/{key_id}`.
*/
pub async fn content_key(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
) -> Response {
    let req_id = Uuid::new_v4();
    let span = tracing::info_span!("content_key", %req_id, %uri);

    async move {
        tracing::info!("started handling request");
        let result = match path {
            Ok(Path(path)) => lookup(&state, &path).await,
            Err(rejection) => Err(RouteError::InvalidPath(rejection.body_text())),
        };
        match result {
            Ok(body) => {
                tracing::info!("finished handling request");
                ([(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, "error handling request");
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

async fn lookup(state: &AppState, path: &str) -> Result<Vec<u8>, RouteError> {
    let req = asset_key_request(path)?;
    let resp = state.key_service.content_key_from(&req).await?;
    Ok(serde_json::to_vec(&resp)?)
}

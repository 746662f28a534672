use drm_core::{KeyIdError, PsshError};
use drm_cpix::CpixError;
use reqwest::StatusCode;
use thiserror::Error;

/**
    Errors from one key lookup. None of them are retried; the display text
    is what the gateway hands back to its caller.
*/
#[derive(Debug, Error)]
pub enum KeyServiceError {
    #[error(transparent)]
    InvalidKeyId(#[from] KeyIdError),

    #[error("creating request body: {0}")]
    RequestBuild(#[source] CpixError),

    #[error("building provider URL from {0:?}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("parsing provider response: {0}")]
    ResponseParse(#[source] CpixError),

    #[error(transparent)]
    PsshDecode(#[from] PsshError),
}

/**
    The provider could not be reached, timed out, or answered with a
    non-success status.
*/
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("making request for key: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("key provider responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/**
    Errors from setting up the key service at startup.
*/
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("provider endpoint {0:?} cannot carry a path")]
    EndpointNotABase(String),

    #[error("auth token is not a valid header value")]
    InvalidToken,

    #[error("creating HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

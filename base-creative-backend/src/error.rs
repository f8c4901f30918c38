//! Error types for publishing and the HTTP surface
//!

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use base_creative_shared::api::ErrorResponse;
use base_creative_shared::error::ArtifactError;

use crate::chain::ChainError;
use crate::gallery::GalleryError;

/// Failure of a single call to a storage backend
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("{0}")]
    MissingCredentials(String),
    #[error("request to {backend} failed: {source}")]
    Request {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{backend} returned status {status}: {body}")]
    Status {
        backend: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected response from {backend}: {message}")]
    InvalidResponse {
        backend: &'static str,
        message: String,
    },
    #[error("failed to build {backend} request: {source}")]
    Build {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Encode(#[from] ArtifactError),
}

/// Pipeline outcome other than success
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Credentials absent; not retryable without operator action
    #[error("missing configuration: {0}")]
    Configuration(String),
    /// Backend unreachable or returned a non-success status; the whole run may be retried
    #[error("upload failed: {0}")]
    Network(String),
    /// Nothing to publish
    #[error("no design to publish")]
    NoArtifact,
    /// Client-supplied image could not be decoded
    #[error("invalid artifact: {0}")]
    Artifact(#[from] ArtifactError),
    /// Upload payload could not be assembled on this side
    #[error("failed to encode upload: {0}")]
    Encode(String),
    /// Run ended without reporting a result
    #[error("publish task failed: {0}")]
    Aborted(String),
    #[error("failed to record gallery entry: {0}")]
    Gallery(#[from] GalleryError),
    #[error("a publish is already in progress")]
    Busy,
}

impl PipelineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Network(_) | PipelineError::Busy)
    }

    /// Aborts that are not surfaced to the user as an error
    pub fn is_silent(&self) -> bool {
        matches!(self, PipelineError::NoArtifact)
    }
}

impl From<PublishError> for PipelineError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::MissingCredentials(msg) => PipelineError::Configuration(msg),
            PublishError::Encode(err) => PipelineError::Encode(err.to_string()),
            err @ PublishError::Build { .. } => PipelineError::Encode(err.to_string()),
            other => PipelineError::Network(other.to_string()),
        }
    }
}

/// Failure while assembling the application state
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open database: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub struct WebError {
    status: StatusCode,
    message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        WebError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse {
            error: self.message,
        };
        let body = serde_json::to_string(&body)
            .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());
        let mut response = axum::response::Response::new(body.into());
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

impl From<PipelineError> for WebError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::NoArtifact | PipelineError::Artifact(_) => StatusCode::BAD_REQUEST,
            PipelineError::Configuration(_)
            | PipelineError::Encode(_)
            | PipelineError::Aborted(_)
            | PipelineError::Gallery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::Network(_) => StatusCode::BAD_GATEWAY,
            PipelineError::Busy => StatusCode::CONFLICT,
        };
        let message = match err {
            PipelineError::NoArtifact => "Missing image data".to_string(),
            other => other.to_string(),
        };
        WebError::new(status, message)
    }
}

impl From<GalleryError> for WebError {
    fn from(err: GalleryError) -> Self {
        WebError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<ChainError> for WebError {
    fn from(err: ChainError) -> Self {
        let status = match err {
            ChainError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        };
        WebError::new(status, err.to_string())
    }
}

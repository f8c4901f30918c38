pub mod chain;
pub mod cli;
pub mod design;
pub mod entity;
pub mod error;
pub mod gallery;
pub mod logging;
pub mod middleware;
pub mod migration;
pub mod openapi;
pub mod pipeline;
pub mod publisher;
pub mod snapshot;
pub mod storage;
#[cfg(test)]
mod tests;

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{header, Response, StatusCode},
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tower::{BoxError, ServiceBuilder};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};
use tracing::{error, info};

use crate::{
    chain::ChainRecorder,
    cli::{db_path_default, CliOpts},
    design::{list_gallery, publish_design, record_design},
    error::{StartupError, WebError},
    gallery::{GalleryStore, SqliteGallery},
    logging::logging_layer,
    pipeline::Pipeline,
    publisher::PublisherBackend,
};

/// Data URLs of 2x renders get large
const PUBLISH_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub type SharedState = Arc<RwLock<AppState>>;

pub struct AppState {
    pub publisher: Arc<dyn PublisherBackend>,
    pub gallery: Arc<dyn GalleryStore>,
    pub chain: Option<Arc<dyn ChainRecorder>>,
    pub external_url: Option<String>,
}

impl AppState {
    pub async fn new(cli: &CliOpts) -> Result<Self, StartupError> {
        let db_path = cli.db_path.clone().unwrap_or(db_path_default().into());
        let conn = storage::start_db(Some(&db_path)).await?;
        let client = cli.http_client()?;

        let publisher = cli.publisher(client.clone());
        if let Err(err) = publisher.ensure_configured() {
            // publishing will fail until this is fixed, the rest of the service still works
            error!("{} backend is not configured: {}", publisher.name(), err);
        }
        info!("Publishing to {}", publisher.name());

        Ok(Self {
            publisher,
            gallery: Arc::new(SqliteGallery::new(conn)),
            chain: cli.chain_recorder(client),
            external_url: cli.external_url.clone(),
        })
    }

    /// A fresh orchestrator sharing this state's backend and gallery
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.publisher.clone(), self.gallery.clone())
            .with_external_url(self.external_url.clone())
    }

    #[cfg(test)]
    pub async fn test(publisher: Arc<dyn PublisherBackend>) -> Self {
        let conn = storage::start_db(None)
            .await
            .expect("Failed to start test DB");
        Self {
            publisher,
            gallery: Arc::new(SqliteGallery::new(conn)),
            chain: None,
            external_url: None,
        }
    }
}

pub fn build_app<T>(shared_state: &SharedState, request_timeout: Duration) -> Router<T> {
    let static_service = ServeDir::new("./dist/").append_index_html_on_directories(true);

    // Build our application by composing routes
    let router = Router::new()
        .route(
            "/api/v1/ipfs",
            post(publish_design).layer(DefaultBodyLimit::max(PUBLISH_BODY_LIMIT)),
        )
        .route("/api/v1/gallery", get(list_gallery))
        .route("/api/v1/design/{cid}/record", post(record_design))
        .merge(openapi::api_route())
        .nest_service("/static", static_service.clone())
        .fallback_service(static_service);

    router
        // Add middleware to all routes
        .layer(
            ServiceBuilder::new()
                // Handle errors from middleware
                .layer(middleware::corslayer())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    |response: &Response<Body>| {
                        if response.status() == StatusCode::OK {
                            "private, no-transform max-age=0".parse().ok()
                        } else {
                            None
                        }
                    },
                ))
                .layer(HandleErrorLayer::new(handle_error))
                .load_shed()
                .concurrency_limit(1024)
                .timeout(request_timeout)
                .layer(logging_layer()),
        )
        .with_state(shared_state.clone())
}

async fn handle_error(error: BoxError) -> WebError {
    if error.is::<tower::timeout::error::Elapsed>() {
        return WebError::new(StatusCode::REQUEST_TIMEOUT, "request timed out");
    }

    if error.is::<tower::load_shed::error::Overloaded>() {
        let msg = "service is overloaded, try again later";
        error!("{}", msg);
        return WebError::new(StatusCode::SERVICE_UNAVAILABLE, msg);
    }

    let msg = format!("Unhandled internal error: {error}");
    error!("{}", msg);
    WebError::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
}

#[tokio::test]
async fn test_handle_error() {
    use axum::response::IntoResponse;

    let err = tower::timeout::error::Elapsed::new();
    let res = handle_error(Box::new(err)).await.into_response();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");

    let err = tower::load_shed::error::Overloaded::new();
    let res = handle_error(Box::new(err)).await.into_response();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}

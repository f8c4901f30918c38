use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(description = "BaseCreative publish API", license(name = "MIT or Apache2", identifier="MIT Apache2.0"), title = "BaseCreative", version = env!("CARGO_PKG_VERSION")),
    paths(
        crate::design::publish_design,
        crate::design::list_gallery,
        crate::design::record_design,
    )
)]
pub struct ApiDoc;

pub(crate) fn api_route<T: Clone + Sync + Send + 'static>() -> Router<T> {
    let doc = ApiDoc::openapi();
    Router::new().merge(SwaggerUi::new("/api/v1/swagger-ui").url("/api/v1/openapi.json", doc))
}

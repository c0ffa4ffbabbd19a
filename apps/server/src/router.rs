use axum::Router;
use axum::http::{HeaderValue, Method};
use folio::domain::config::ServerConfig;
use folio::kernel::server::ApiState;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Folio", description = "Read-only project catalog"))]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let server = state.config.server.clone();

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(folio::server::router())
        .with_state(state)
        .split_for_parts();

    let mut app = Router::new().merge(openapi_routes).merge(Scalar::with_url("/api", api_doc));

    match server.static_dir.as_ref().filter(|dir| dir.is_dir()) {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Serving static frontend");
            app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        },
        None => tracing::debug!("No static frontend directory; fallback disabled"),
    }

    if let Some(cors) = cors_layer(&server) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// `None` when no origins are configured; `["*"]` allows any origin.
fn cors_layer(server: &ServerConfig) -> Option<CorsLayer> {
    if server.cors_origins.is_empty() {
        return None;
    }

    let origins = if server.cors_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = server
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin, "Ignoring invalid CORS origin");
                    None
                },
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    Some(CorsLayer::new().allow_origin(origins).allow_methods([Method::GET]))
}

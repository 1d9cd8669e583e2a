pub mod customers;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use common::{observability, types::Health};
use service::customer::CustomerRepository;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::openapi::ApiDoc;

/// Shared handler state. The repository is injected by the caller so tests can swap it.
#[derive(Clone)]
pub struct ServerState {
    pub customers: Arc<dyn CustomerRepository>,
}

impl ServerState {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router: customer CRUD, health, metrics and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let customer_routes = Router::new()
        .route(
            customers::BASE_PATH,
            get(customers::list).post(customers::create),
        )
        .route(
            &format!("{}/:id", customers::BASE_PATH),
            get(customers::get_by_id)
                .put(customers::update)
                .delete(customers::delete),
        )
        .with_state(state);

    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public
        .merge(customer_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

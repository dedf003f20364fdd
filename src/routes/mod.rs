pub mod relay_routes;


use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::relay_service::RelayService;
use relay_routes::legal_chat_handler;

pub const RELAY_PATH: &str = "/legal-chat";

/// Permissive CORS: any origin, the browser client's header set. Preflight
/// requests are answered here without reaching a handler.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}

pub fn build_router(service: RelayService) -> Router {
    Router::new()
        .route("/", post(legal_chat_handler))
        .route(RELAY_PATH, post(legal_chat_handler))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

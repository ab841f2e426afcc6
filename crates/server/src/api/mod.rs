//! REST API layer: router, handlers, models and error mapping.

pub mod errors;
pub mod handlers;
pub mod models;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use handlers::AppState;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/documents",
            get(handlers::list_documents).post(handlers::upload_documents),
        )
        .route("/documents/pdf-batch", post(handlers::upload_pdf_batch))
        .route("/documents/{doc_id}", delete(handlers::delete_document))
        .route("/query", post(handlers::query))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(DefaultBodyLimit::disable())
                .map_response(axum::response::IntoResponse::into_response)
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}

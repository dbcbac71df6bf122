use crate::api::{handlers, AppState};
use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Prediction form
        .route("/", get(handlers::show_form).post(handlers::submit_form))
        // Health endpoint
        .route("/health", get(handlers::health_check))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}

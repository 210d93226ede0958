use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // The swap frontend calls /send_prompt from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard
        .route("/", get(handlers::dashboard))
        // Agent callbacks (both paths are in use by deployed agents)
        .route("/agent_callback", post(handlers::agent_callback))
        .route("/agent_response", post(handlers::agent_callback))
        // Query endpoint
        .route("/get_all_responses", get(handlers::get_all_responses))
        // Fan-out endpoints
        .route("/send_prompt", post(handlers::send_prompt))
        .route("/broadcast", post(handlers::broadcast))
        // System endpoints
        .route("/health", get(handlers::health_handler))
        // Add state, tracing and CORS
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

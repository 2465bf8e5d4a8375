//! API Routes
//!
//! Configures the Axum router with the KV endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, get_handler, has_handler, health_handler, mexpire_handler,
    mget_handler, set_handler, ttl_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /kv/:storage/has` - Which keys have an entry
/// - `GET /kv/:storage/get/:key` - Retrieve one value
/// - `POST /kv/:storage/mget` - Retrieve several values
/// - `POST /kv/:storage/set` - Store items
/// - `POST /kv/:storage/mexpire` - Update expirations
/// - `POST /kv/:storage/ttl` - Remaining lifetimes (unsupported by memcached)
/// - `POST /kv/:storage/delete` - Remove keys
/// - `POST /kv/:storage/clear` - Remove everything
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/kv/:storage/has", post(has_handler))
        .route("/kv/:storage/get/:key", get(get_handler))
        .route("/kv/:storage/mget", post(mget_handler))
        .route("/kv/:storage/set", post(set_handler))
        .route("/kv/:storage/mexpire", post(mexpire_handler))
        .route("/kv/:storage/ttl", post(ttl_handler))
        .route("/kv/:storage/delete", post(delete_handler))
        .route("/kv/:storage/clear", post(clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

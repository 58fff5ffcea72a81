// Server module - HTTP server setup and routing
pub mod handlers;
pub mod params;
pub mod state;

use std::net::SocketAddr;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::IndexingError;
use self::state::AppState;

pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/products/search", get(handlers::search_products))
        .route("/products/aggregations", get(handlers::product_aggregations))
        .route("/rates", get(handlers::currency_rates))
        .route("/rates/convert", get(handlers::convert_currency))
        .route("/webhooks/strapi", post(handlers::strapi_webhook))
        .layer(create_cors_layer())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), IndexingError> {
    info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| IndexingError::server(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| IndexingError::server(e.to_string()))
}

//! Top-level router assembly.

use axum::http::HeaderValue;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::adapters::websocket::{websocket_router, Hub};
use crate::config::AppConfig;

use super::health::health_router;

/// Builds the application router: health and WebSocket routes, with tracing,
/// CORS and request timeout layers.
///
/// # Example
///
/// ```ignore
/// let hub = Hub::spawn(config.realtime.hub_settings());
/// let app = app_router(hub, &config);
/// axum::serve(listener, app).await?;
/// ```
pub fn app_router(hub: Hub, config: &AppConfig) -> Router {
    Router::new()
        .merge(health_router())
        .merge(websocket_router(&config.realtime.ws_path))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.server.cors_origins_list()))
                .layer(TimeoutLayer::new(config.server.request_timeout())),
        )
        .with_state(hub)
}

/// Allows the configured origins, or any origin when none are configured.
/// Unparseable origins are skipped, never widened to "any".
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

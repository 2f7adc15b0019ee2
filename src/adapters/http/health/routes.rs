//! Axum router configuration for the health endpoint.

use axum::{routing::get, Router};

use crate::adapters::websocket::Hub;

use super::handlers::health;

/// Create the health router.
///
/// # Routes
/// - `GET /health` - Returns `{"status":"ok","connected_clients":N}`
pub fn health_router() -> Router<Hub> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::health::HealthResponse;
    use crate::adapters::websocket::{HubSettings, SessionHandle};
    use crate::domain::foundation::ClientId;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn get_health(hub: Hub) -> (StatusCode, HealthResponse) {
        let response = health_router()
            .with_state(hub)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn reports_ok_with_no_clients() {
        let hub = Hub::spawn(HubSettings::default());

        let (status, body) = get_health(hub).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, HealthResponse::ok(0));
    }

    #[tokio::test]
    async fn reports_connected_client_count() {
        let hub = Hub::spawn(HubSettings::default());
        let (first, _first_mailbox) = SessionHandle::open(ClientId::new(), 4);
        let (second, _second_mailbox) = SessionHandle::open(ClientId::new(), 4);
        hub.register(first);
        hub.register(second);
        for _ in 0..200 {
            if hub.live_count() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let (_, body) = get_health(hub).await;

        assert_eq!(body.connected_clients, 2);
        assert_eq!(body.status, "ok");
    }
}

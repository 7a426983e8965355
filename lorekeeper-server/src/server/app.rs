use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::handlers::health;
use super::websocket::transfer_websocket_handler;
use lorekeeper::transfer::{TransferCoordinator, TransferService};
use lorekeeper::LorekeeperConfig;

#[derive(Clone)]
pub struct AppState {
    pub transfer: Arc<TransferService>,
    pub coordinator: TransferCoordinator,
    /// Directory used when a command does not name one
    pub default_dir: PathBuf,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &LorekeeperConfig) -> Self {
        Self {
            transfer: Arc::new(TransferService::new(db, config.transfer_settings())),
            coordinator: TransferCoordinator::new(),
            default_dir: config.transfer_dir.clone(),
        }
    }
}

pub async fn create_app(
    db: DatabaseConnection,
    config: &LorekeeperConfig,
    cors_origin: Option<&str>,
) -> Result<Router> {
    let state = AppState::new(db, config);

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?,
            )
            .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
            .allow_headers(Any)
            .allow_credentials(false),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
            .allow_headers(Any)
            .allow_credentials(false),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ws/transfer", get(transfer_websocket_handler))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use lorekeeper_test_utils::TestDb;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_service_name() {
        let db = TestDb::new_in_memory().connect().await.unwrap();
        let app = create_app(db, &LorekeeperConfig::default(), None)
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["service"], "lorekeeper-server");
    }

    #[tokio::test]
    async fn invalid_cors_origin_is_rejected() {
        let db = TestDb::new_in_memory().connect().await.unwrap();
        let result = create_app(db, &LorekeeperConfig::default(), Some("not a\norigin")).await;
        assert!(result.is_err());
    }
}

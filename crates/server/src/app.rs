use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::health::health;
use crate::routes::inference::inference;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // The chat UI is served from arbitrary origins; the API itself is
    // guarded by Basic Auth, not by CORS.
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/inference", post(inference))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(app: Router, bind_address: &str, port: u16) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.started",
        bind_address = %address,
        "inference endpoint accepting connections"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(wait_for_shutdown())
        .await
}

async fn wait_for_shutdown() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(event_name = "system.server.stopping", "shutdown signal received");
    }
}

use crate::{PeerRegistry, ws_handler};
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Path browsers open their relay socket on.
pub const WS_PATH: &str = "/ws";

pub fn relay_router(registry: PeerRegistry) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(WS_PATH, get(ws_handler))
        .layer(cors)
        .with_state(registry)
}

/// Serves the relay on an already bound listener until the process stops.
pub async fn serve(listener: TcpListener, registry: PeerRegistry) -> anyhow::Result<()> {
    info!("Relay listening on ws://{}{}", listener.local_addr()?, WS_PATH);
    axum::serve(listener, relay_router(registry)).await?;
    Ok(())
}

//! HTTP gateway
//!
//! The inbound surface the rest of the application consumes: onboard,
//! transfer, history, and account lookup for QR display.

pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/onboard", post(handlers::onboard))
        .route("/api/v1/transfer", post(handlers::create_transfer))
        .route("/api/v1/history", get(handlers::get_history))
        .route("/api/v1/account/{id}", get(handlers::get_account))
        .with_state(state)
}

pub async fn run_gateway(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

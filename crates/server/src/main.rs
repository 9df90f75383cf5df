use std::net::SocketAddr;

use axum::{
    body::Bytes,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{error::ApiError, protocol::OrderRecord};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;

use api::{lookup_order, parse_order_lookup, ORDERS_ROUTE};
use config::load_settings;

const MAX_TOOL_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let app = build_router();

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "order lookup server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(ORDERS_ROUTE, post(http_lookup_order))
        .layer(RequestBodyLimitLayer::new(MAX_TOOL_BODY_BYTES))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_lookup_order(body: Bytes) -> Result<Json<OrderRecord>, (StatusCode, Json<ApiError>)> {
    let order_number = parse_order_lookup(&body).map_err(|err| {
        warn!(%err, "order lookup rejected");
        (StatusCode::BAD_REQUEST, Json(ApiError::from(err)))
    })?;

    info!(%order_number, "order lookup");
    Ok(Json(lookup_order(order_number)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

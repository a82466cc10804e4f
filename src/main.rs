//! Location relay server.
//!
//! Run the server with
//! ```not_rust
//! cargo run --bin location-relay
//! ```
//!
//! then point a viewer and a sender at it
//! ```not_rust
//! cargo run --bin viewer
//! echo "37.1,-122.2" | cargo run --bin sender
//! ```

use std::sync::Arc;
use axum::BoxError;
use once_cell::sync::Lazy;
use tracing::info;
use location_relay::config::RelayConfig;
use location_relay::handlers::relay::Relay;
use location_relay::server;

static CONFIG: Lazy<RelayConfig> = Lazy::new(RelayConfig::init);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    location_relay::init_tracing("location_relay=debug,tower_http=debug");

    let addr = tokio::net::lookup_host(CONFIG.bind_addr())
        .await?
        .next()
        .ok_or_else(|| format!("no address for {}", CONFIG.bind_addr()))?;

    let (addr, server) = server::bind(addr, Arc::new(Relay::new()))?;
    info!("WebSocket server running on ws://{}", addr);
    server.await
}

//! A single-room live location relay.
//!
//! The relay accepts WebSocket connections on `/` and rebroadcasts every
//! message it receives, unchanged, to every open connection (the sender
//! included). The `clients` module holds the two ends that talk to it: a
//! [`LocationSender`](clients::sender::LocationSender) that publishes
//! `{"lat": .., "lng": ..}` updates, and a
//! [`LocationTracker`](clients::viewer::LocationTracker) that follows them and
//! reconnects after a fixed delay.

pub mod clients;
pub mod config;
pub mod handlers;
pub mod models;
pub mod server;
pub mod task;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

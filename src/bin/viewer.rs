//! Follows the relay and logs every position it would put on the map.

use futures::StreamExt;
use tracing::info;
use location_relay::clients::viewer::{LocationTracker, TrackerEvent};
use location_relay::config::ClientConfig;

#[tokio::main]
async fn main() {
    location_relay::init_tracing("location_relay=info,viewer=info");

    let config = ClientConfig::init();
    info!("Waiting for live location updates from {}", config.relay_url);

    let events = LocationTracker::new(config.relay_url, config.reconnect_delay).track();
    futures::pin_mut!(events);
    while let Some(event) = events.next().await {
        if let TrackerEvent::Position(position) = event {
            info!("Delivery location: {}, {}", position.lat, position.lng);
        }
    }
}

//! Publishes positions read from stdin, one `lat,lng` (or JSON) per line.

use tokio::io::BufReader;
use location_relay::clients::sender::LocationSender;
use location_relay::clients::source::LinePositionSource;
use location_relay::config::ClientConfig;
use location_relay::models::error::ClientError;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    location_relay::init_tracing("location_relay=info,sender=info");

    let config = ClientConfig::init();
    let source = LinePositionSource::new(BufReader::new(tokio::io::stdin()));
    LocationSender::new(config.relay_url).run(source).await
}

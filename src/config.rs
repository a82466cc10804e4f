use std::env;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RELAY_URL: &str = "ws://localhost:8080";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct RelayConfig {
    pub host: String,
    pub port: u16,
}

impl RelayConfig {
    pub fn init() -> RelayConfig {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        RelayConfig { host, port }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub struct ClientConfig {
    pub relay_url: String,
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn init() -> ClientConfig {
        let relay_url = env::var("RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
        let reconnect_delay = env::var("RECONNECT_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RECONNECT_DELAY);
        ClientConfig {
            relay_url,
            reconnect_delay,
        }
    }
}

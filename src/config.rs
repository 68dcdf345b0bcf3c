use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PriceFeedError, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4567;
const DEFAULT_HEARTBEAT_SECS: u64 = 30;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SEND_QUEUE_CAPACITY: usize = 1_024;

/// Server configuration.
///
/// Resolved from defaults, then environment variables, then CLI overrides:
///   PRICE_FEED_HOST              bind address (default 127.0.0.1)
///   PRICE_FEED_PORT              bind port (default 4567)
///   PRICE_FEED_ITEMS_FILE        JSON seed catalog
///   PRICE_FEED_STATIC_DIR        directory served under /static
///   PRICE_FEED_HEARTBEAT_SECS    WebSocket ping interval
///   PRICE_FEED_WRITE_TIMEOUT_MS  per-message socket write timeout
///   PRICE_FEED_SEND_QUEUE        outbound messages buffered per client
///   PRICE_FEED_EVICT_ON_FAILURE  drop a connection after one failed send
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub items_file: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub heartbeat_interval: Duration,
    pub write_timeout: Duration,
    /// A client whose queue fills up is disconnected
    pub send_queue_capacity: usize,
    pub evict_on_failure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            items_file: None,
            static_dir: None,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            evict_on_failure: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(|_| {
            PriceFeedError::InvalidInput(format!("Invalid value for {}: '{}'", name, raw))
        }),
        _ => Ok(None),
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

impl ServerConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = env_parse::<String>("PRICE_FEED_HOST")? {
            config.host = host;
        }
        if let Some(port) = env_parse("PRICE_FEED_PORT")? {
            config.port = port;
        }
        if let Some(path) = env_parse::<PathBuf>("PRICE_FEED_ITEMS_FILE")? {
            config.items_file = Some(path);
        }
        if let Some(path) = env_parse::<PathBuf>("PRICE_FEED_STATIC_DIR")? {
            config.static_dir = Some(path);
        }
        if let Some(secs) = env_parse::<u64>("PRICE_FEED_HEARTBEAT_SECS")? {
            if secs == 0 {
                return Err(PriceFeedError::InvalidInput(
                    "PRICE_FEED_HEARTBEAT_SECS must be greater than 0".into(),
                ));
            }
            config.heartbeat_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = env_parse::<u64>("PRICE_FEED_WRITE_TIMEOUT_MS")? {
            if ms == 0 {
                return Err(PriceFeedError::InvalidInput(
                    "PRICE_FEED_WRITE_TIMEOUT_MS must be greater than 0".into(),
                ));
            }
            config.write_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = env_parse::<usize>("PRICE_FEED_SEND_QUEUE")? {
            if capacity == 0 {
                return Err(PriceFeedError::InvalidInput(
                    "PRICE_FEED_SEND_QUEUE must be greater than 0".into(),
                ));
            }
            config.send_queue_capacity = capacity;
        }
        config.evict_on_failure = env_flag("PRICE_FEED_EVICT_ON_FAILURE");

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

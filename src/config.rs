use crate::storage::resolve_data_path;
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Settings for the HTTP server, read from `PORT` and `APP_DATA_PATH`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_path = resolve_data_path(lookup("APP_DATA_PATH").as_deref());
        Self { port, data_path }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Settings for [`crate::client::HttpEntryClient`] and the table page size.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub page_size: u64,
    /// `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("SLIM_TRACK_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);
        let page_size = lookup("SLIM_TRACK_PAGE_SIZE")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.page_size);
        let timeout = lookup("SLIM_TRACK_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self {
            base_url,
            page_size,
            timeout,
        }
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub bind_addr: SocketAddr,
    /// Base URL of the Nominatim instance used directly and by the proxy.
    pub nominatim_url: String,
    /// Origin serving `/api/geocode/*`; when set the proxy is tried first.
    pub proxy_origin: Option<String>,
    /// Photon base URL, appended to the provider chain as the last fallback.
    pub photon_url: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub search_limit: usize,
    pub min_query_chars: usize,
    pub debounce_ms: u64,
    pub focus_zoom: u8,
    pub geolocation_timeout_secs: u64,
    pub geolocation_max_age_secs: u64,
    pub stores_path: PathBuf,
}

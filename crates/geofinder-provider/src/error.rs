use thiserror::Error;

/// Failures inside a geocoding provider.
///
/// These never cross the fail-soft boundary of
/// [`GeoProvider::forward_search`](crate::GeoProvider::forward_search) and
/// [`GeoProvider::reverse_lookup`](crate::GeoProvider::reverse_lookup); they
/// exist so fallback chains can tell "failed" apart from "found nothing".
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body did not match the provider's wire format.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("all {attempted} geocoding providers failed")]
    AllProvidersFailed { attempted: usize },
}

//! Shared HTTP plumbing for the concrete providers.

use std::time::Duration;

use geofinder_core::AppConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::GeocodeError;
use crate::provider::DEFAULT_MIN_QUERY_CHARS;

/// Client settings shared by every HTTP-backed provider.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
    pub min_query_chars: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "geofinder/0.1 (store-locator)".to_string(),
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            min_query_chars: config.min_query_chars,
        }
    }
}

/// Builds a client with the configured timeout and User-Agent.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(settings: &HttpSettings) -> Result<Client, GeocodeError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(settings.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Parses `base_url` and joins `path` onto it.
///
/// The base is normalised to end in exactly one slash first, so
/// `https://host/app` and `https://host/app/` both resolve `search` to
/// `https://host/app/search`.
///
/// # Errors
///
/// Returns [`GeocodeError::InvalidBaseUrl`] when `base_url` does not parse
/// or cannot act as a base.
pub fn endpoint(base_url: &str, path: &str) -> Result<Url, GeocodeError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let invalid = |reason: String| GeocodeError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    base.join(path).map_err(|e| invalid(e.to_string()))
}

/// Clones `url` and appends `params` as query pairs (percent-encoded).
pub fn with_query(url: &Url, params: &[(&str, &str)]) -> Url {
    let mut url = url.clone();
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    url
}

/// Sends a GET request, asserts a 2xx HTTP status, and parses the body.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] on network failure,
/// [`GeocodeError::UnexpectedStatus`] on a non-2xx status, and
/// [`GeocodeError::Deserialize`] if the body does not match `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &Url,
) -> Result<T, GeocodeError> {
    let response = client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GeocodeError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
        context: url.path().to_string(),
        source: e,
    })
}

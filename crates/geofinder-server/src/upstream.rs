//! The Nominatim instance the proxy forwards to.

use geofinder_core::{AppConfig, Coordinate};
use geofinder_provider::http::{build_client, endpoint, with_query};
use geofinder_provider::{GeocodeError, HttpSettings};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

/// What the upstream said, short of a transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Forwarded {
    /// `200 OK` with a JSON body, passed through untouched.
    Body(Value),
    /// Any other status. The proxy mirrors it with an empty body.
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct NominatimUpstream {
    client: Client,
    search_url: Url,
    reverse_url: Url,
}

impl NominatimUpstream {
    pub fn new(base_url: &str, settings: &HttpSettings) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: build_client(settings)?,
            search_url: endpoint(base_url, "search")?,
            reverse_url: endpoint(base_url, "reverse")?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GeocodeError> {
        Self::new(&config.nominatim_url, &HttpSettings::from_config(config))
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<Forwarded, GeocodeError> {
        let limit = limit.to_string();
        let url = with_query(
            &self.search_url,
            &[
                ("q", query),
                ("format", "jsonv2"),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ],
        );
        self.forward(&url).await
    }

    pub async fn reverse(&self, coordinate: Coordinate) -> Result<Forwarded, GeocodeError> {
        let lat = coordinate.latitude().to_string();
        let lon = coordinate.longitude().to_string();
        let url = with_query(
            &self.reverse_url,
            &[
                ("format", "jsonv2"),
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("zoom", "14"),
                ("addressdetails", "1"),
            ],
        );
        self.forward(&url).await
    }

    async fn forward(&self, url: &Url) -> Result<Forwarded, GeocodeError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(Forwarded::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value = serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })?;
        Ok(Forwarded::Body(value))
    }
}

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{GeocodeError, Geocoder, Place, SearchOptions, Throttle};
use crate::config::GeocoderConfig;

/// HTTP client for the Nominatim `/search` endpoint.
pub struct NominatimClient {
    http: Client,
    search_url: String,
    throttle: Throttle,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        // Nominatim's usage policy requires an identifying User-Agent
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
            throttle: Throttle::new(config.delay),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<Place>, GeocodeError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", options.limit.to_string()),
        ];
        if options.address_details {
            params.push(("addressdetails", "1".to_string()));
        }

        self.throttle.wait().await;

        debug!(query, limit = options.limit, "Sending geocoding request");

        let response = self
            .http
            .get(&self.search_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<Place> = response.json().await?;
        debug!(query, matches = places.len(), "Geocoding response received");

        Ok(places)
    }
}

//! Address lookups against a Nominatim-compatible search API.
//!
//! [`Geocoder`] is the seam between the application and the external
//! service. [`NominatimClient`] is the HTTP implementation; the
//! [`AddressResolver`] and [`suggest`] build on top of any `Geocoder`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod nominatim;
pub mod resolver;
pub mod suggestions;
pub mod throttle;

pub use nominatim::NominatimClient;
pub use resolver::{compose_query, simplify_query, AddressResolver};
pub use suggestions::{suggest, LocationSuggestion};
pub use throttle::Throttle;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Geocoding service responded with status {0}")]
    Status(u16),

    #[error("Geocoding service returned an invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One candidate match. Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub display_name: String,
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub address: Option<PlaceAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceAddress {
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
}

impl Place {
    pub fn coordinates(&self) -> Result<Coordinates, GeocodeError> {
        Ok(Coordinates {
            latitude: parse_coordinate(&self.lat)?,
            longitude: parse_coordinate(&self.lon)?,
        })
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidCoordinate(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: u8,
    pub address_details: bool,
}

impl SearchOptions {
    /// The single best match, used for resolving an event address.
    pub const fn best_match() -> Self {
        Self {
            limit: 1,
            address_details: false,
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Free-text forward search. An empty vector means "no match".
    async fn search(&self, query: &str, options: SearchOptions)
        -> Result<Vec<Place>, GeocodeError>;
}

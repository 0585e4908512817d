use serde::{Deserialize, Serialize};

use super::{GeocodeError, Geocoder, Place, SearchOptions};

/// Shorter queries are answered with an empty list and never sent upstream.
pub const MIN_QUERY_CHARS: usize = 3;
pub const MAX_SUGGESTIONS: u8 = 5;

/// Address autocomplete entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub address: String,
    pub postal_code: String,
    pub street: String,
    pub house_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Place> for LocationSuggestion {
    fn from(place: Place) -> Self {
        let coordinates = place.coordinates().ok();
        let address = place.address.unwrap_or_default();

        Self {
            address: place.display_name,
            postal_code: address.postcode.unwrap_or_default(),
            street: address.road.unwrap_or_default(),
            house_number: address.house_number.unwrap_or_default(),
            latitude: coordinates.map(|c| c.latitude),
            longitude: coordinates.map(|c| c.longitude),
        }
    }
}

/// Forwards a partial address verbatim and maps the candidate matches.
pub async fn suggest(
    geocoder: &dyn Geocoder,
    query: &str,
) -> Result<Vec<LocationSuggestion>, GeocodeError> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }

    let options = SearchOptions {
        limit: MAX_SUGGESTIONS,
        address_details: true,
    };
    let places = geocoder.search(query, options).await?;

    Ok(places.into_iter().map(LocationSuggestion::from).collect())
}

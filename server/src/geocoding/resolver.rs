use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{Coordinates, Geocoder, SearchOptions};
use crate::models::event::non_empty;
use crate::models::AddressFields;

/// Segments kept when a full address finds no match.
const FALLBACK_SEGMENTS: usize = 2;

/// Builds the lookup string: street with number, postal code, venue name.
///
/// Returns `None` when every field is blank. A street number on its own is
/// meaningless to the geocoder and is dropped.
pub fn compose_query(address: &AddressFields) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(street) = non_empty(address.street_name.as_deref()) {
        match non_empty(address.street_number.as_deref()) {
            Some(number) => parts.push(format!("{street} {number}")),
            None => parts.push(street.to_string()),
        }
    }
    if let Some(postal_code) = non_empty(address.postal_code.as_deref()) {
        parts.push(postal_code.to_string());
    }
    if let Some(name) = non_empty(address.location_name.as_deref()) {
        parts.push(name.to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// First two comma separated segments of `query`.
pub fn simplify_query(query: &str) -> String {
    query
        .split(',')
        .map(str::trim)
        .take(FALLBACK_SEGMENTS)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns event address fields into coordinates. Never fails: every problem
/// is logged and reported as "no coordinates".
#[derive(Clone)]
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    pub async fn resolve(&self, address: &AddressFields) -> Option<Coordinates> {
        let Some(query) = compose_query(address) else {
            debug!("No address fields set, skipping geocoding");
            return None;
        };

        // Only a query with more segments than the fallback keeps can shrink
        let fallback = (query.split(',').count() > FALLBACK_SEGMENTS)
            .then(|| simplify_query(&query))
            .filter(|simplified| *simplified != query);

        // At most one retry, and only when the full address had no match
        for attempt in std::iter::once(query.as_str()).chain(fallback.as_deref()) {
            let places = match self
                .geocoder
                .search(attempt, SearchOptions::best_match())
                .await
            {
                Ok(places) => places,
                Err(err) => {
                    warn!(query = attempt, error = %err, "Geocoding failed");
                    return None;
                }
            };

            let Some(place) = places.first() else {
                debug!(query = attempt, "No geocoding match");
                continue;
            };

            return match place.coordinates() {
                Ok(coordinates) => {
                    info!(
                        query = attempt,
                        latitude = coordinates.latitude,
                        longitude = coordinates.longitude,
                        "Address geocoded"
                    );
                    Some(coordinates)
                }
                Err(err) => {
                    warn!(query = attempt, error = %err, "Geocoding failed");
                    None
                }
            };
        }

        info!(query = %query, "Address could not be geocoded");
        None
    }
}

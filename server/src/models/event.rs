use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

const TITLE_MAX_CHARS: usize = 100;
const LOCATION_NAME_MAX_CHARS: usize = 100;
const STREET_NAME_MAX_CHARS: usize = 100;
const STREET_NUMBER_MAX_CHARS: usize = 20;
const POSTAL_CODE_MAX_CHARS: usize = 20;

/// Format used when an event start is shown on a map popup.
pub const DISPLAY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    pub location_name: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub file_path: Option<String>,
    pub category_id: Option<i64>,
    /// Joined from the owning category, never stored on the event row.
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Human readable location: venue, street with number, postal code.
    pub fn location(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(name) = non_empty(self.location_name.as_deref()) {
            parts.push(name.to_string());
        }
        if let Some(street) = non_empty(self.street_name.as_deref()) {
            match non_empty(self.street_number.as_deref()) {
                Some(number) => parts.push(format!("{street} {number}")),
                None => parts.push(street.to_string()),
            }
        }
        if let Some(postal_code) = non_empty(self.postal_code.as_deref()) {
            parts.push(postal_code.to_string());
        }

        parts.join(", ")
    }

    pub fn has_valid_coordinates(&self) -> bool {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon),
            _ => false,
        }
    }
}

/// Event as returned by the API, with the derived display location.
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub location: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let location = event.location();
        Self { event, location }
    }
}

/// The four free-text address fields an event may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub location_name: Option<String>,
    pub street_name: Option<String>,
    pub street_number: Option<String>,
    pub postal_code: Option<String>,
}

/// User-supplied event fields for create and edit. Coordinates are not part
/// of the input; they are always derived from the address.
#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub start_datetime: NaiveDateTime,
    pub end_datetime: NaiveDateTime,
    pub address: AddressFields,
    pub category_id: Option<i64>,
}

impl EventInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        check_length("Title", Some(&self.title), TITLE_MAX_CHARS)?;
        check_length(
            "Location name",
            self.address.location_name.as_deref(),
            LOCATION_NAME_MAX_CHARS,
        )?;
        check_length(
            "Street name",
            self.address.street_name.as_deref(),
            STREET_NAME_MAX_CHARS,
        )?;
        check_length(
            "Street number",
            self.address.street_number.as_deref(),
            STREET_NUMBER_MAX_CHARS,
        )?;
        check_length(
            "Postal code",
            self.address.postal_code.as_deref(),
            POSTAL_CODE_MAX_CHARS,
        )?;

        if self.end_datetime < self.start_datetime {
            return Err("End date & time must not be before the start".to_string());
        }

        Ok(())
    }
}

/// A point on the events map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub start: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl MapMarker {
    pub fn from_event(event: &Event) -> Option<Self> {
        if !event.has_valid_coordinates() {
            return None;
        }

        Some(Self {
            id: event.id,
            title: event.title.clone(),
            location: event.location(),
            start: event
                .start_datetime
                .format(DISPLAY_DATETIME_FORMAT)
                .to_string(),
            latitude: event.latitude?,
            longitude: event.longitude?,
        })
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn check_length(label: &str, value: Option<&str>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(format!("{label} must be at most {max} characters"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn event() -> Event {
        Event {
            id: 1,
            title: "Python Developers Conference".to_string(),
            description: None,
            start_datetime: at(10, 9),
            end_datetime: at(11, 17),
            location_name: Some("Amsterdam Convention Center".to_string()),
            street_name: Some("Europaplein".to_string()),
            street_number: Some("24".to_string()),
            postal_code: Some("1078 GZ".to_string()),
            latitude: Some(52.3423),
            longitude: Some(4.8898),
            file_path: None,
            category_id: None,
            category_name: None,
            created_at: Utc::now(),
        }
    }

    fn input() -> EventInput {
        EventInput {
            title: "Meetup".to_string(),
            description: None,
            start_datetime: at(1, 18),
            end_datetime: at(1, 21),
            address: AddressFields::default(),
            category_id: None,
        }
    }

    #[test]
    fn test_location_lists_venue_then_street_then_postal_code() {
        assert_eq!(
            event().location(),
            "Amsterdam Convention Center, Europaplein 24, 1078 GZ"
        );
    }

    #[test]
    fn test_location_skips_blank_parts() {
        let mut e = event();
        e.location_name = Some("  ".to_string());
        e.street_number = None;
        assert_eq!(e.location(), "Europaplein, 1078 GZ");
    }

    #[test]
    fn test_marker_requires_coordinates_in_range() {
        let e = event();
        let marker = MapMarker::from_event(&e).unwrap();
        assert_eq!(marker.start, "2024-06-10 09:00");

        let mut out_of_range = event();
        out_of_range.latitude = Some(123.0);
        assert!(MapMarker::from_event(&out_of_range).is_none());

        let mut missing = event();
        missing.longitude = None;
        assert!(MapMarker::from_event(&missing).is_none());
    }

    #[test]
    fn test_validate_requires_title() {
        let mut i = input();
        i.title = "   ".to_string();
        assert_eq!(i.validate().unwrap_err(), "Title is required");
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let mut i = input();
        i.end_datetime = at(1, 17);
        assert!(i.validate().is_err());

        i.end_datetime = i.start_datetime;
        assert!(i.validate().is_ok());
    }

    #[test]
    fn test_validate_enforces_column_lengths() {
        let mut i = input();
        i.address.postal_code = Some("1".repeat(21));
        assert!(i.validate().unwrap_err().contains("Postal code"));
    }
}

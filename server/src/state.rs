use std::sync::Arc;

use sqlx::SqlitePool;

use crate::geocoding::{AddressResolver, Geocoder};
use crate::services::{CategoryService, EventService};
use crate::storage::AttachmentStore;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub categories: CategoryService,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    pub fn new(pool: SqlitePool, geocoder: Arc<dyn Geocoder>, attachments: AttachmentStore) -> Self {
        let resolver = AddressResolver::new(Arc::clone(&geocoder));

        Self {
            events: EventService::new(pool.clone(), resolver, attachments),
            categories: CategoryService::new(pool),
            geocoder,
        }
    }
}

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::{self, EventFilter, ListParams};
use crate::geocoding::AddressResolver;
use crate::models::{Event, EventInput, EventResponse, MapMarker};
use crate::storage::{AttachmentStore, Upload};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct EventListing {
    pub events: Vec<EventResponse>,
    pub warnings: Vec<String>,
}

/// Event use cases: geocoding and attachments wrapped around persistence.
#[derive(Clone)]
pub struct EventService {
    pool: SqlitePool,
    resolver: AddressResolver,
    attachments: AttachmentStore,
}

impl EventService {
    pub fn new(pool: SqlitePool, resolver: AddressResolver, attachments: AttachmentStore) -> Self {
        Self {
            pool,
            resolver,
            attachments,
        }
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    pub async fn list(&self, params: &ListParams) -> AppResult<EventListing> {
        let (filter, warnings) = EventFilter::from_params(params);
        for warning in &warnings {
            warn!(%warning, "Ignoring listing filter");
        }

        let events = db::events::list(&self.pool, &filter).await?;
        debug!(count = events.len(), ?filter, "Listed events");

        Ok(EventListing {
            events: events.into_iter().map(EventResponse::from).collect(),
            warnings,
        })
    }

    pub async fn markers(&self) -> AppResult<Vec<MapMarker>> {
        let events = db::events::list_geocoded(&self.pool).await?;
        Ok(events.iter().filter_map(MapMarker::from_event).collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<Event> {
        db::events::find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    pub async fn create(&self, input: EventInput, upload: Option<Upload>) -> AppResult<Event> {
        self.validate(&input, upload.as_ref()).await?;

        let coordinates = self.resolver.resolve(&input.address).await;
        let file_path = self.store(upload.as_ref()).await;

        let inserted =
            db::events::insert(&self.pool, &input, coordinates, file_path.as_deref()).await;
        let id = match inserted {
            Ok(id) => id,
            Err(err) => {
                self.discard(file_path.as_deref()).await;
                return Err(err.into());
            }
        };

        info!(
            event_id = id,
            geocoded = coordinates.is_some(),
            attachment = file_path.is_some(),
            "Created event"
        );
        self.get(id).await
    }

    /// Full overwrite of the user fields. The attachment is replaced only
    /// when a new file comes with the edit.
    pub async fn update(
        &self,
        id: i64,
        input: EventInput,
        upload: Option<Upload>,
    ) -> AppResult<Event> {
        let existing = self.get(id).await?;
        self.validate(&input, upload.as_ref()).await?;

        let coordinates = self.resolver.resolve(&input.address).await;
        let new_file = self.store(upload.as_ref()).await;
        let file_path = new_file.as_deref().or(existing.file_path.as_deref());

        let updated = db::events::update(&self.pool, id, &input, coordinates, file_path).await;
        match updated {
            Ok(0) => {
                self.discard(new_file.as_deref()).await;
                return Err(AppError::NotFound(format!("Event {} not found", id)));
            }
            Ok(_) => {}
            Err(err) => {
                self.discard(new_file.as_deref()).await;
                return Err(err.into());
            }
        }

        if new_file.is_some() {
            self.discard(existing.file_path.as_deref()).await;
        }

        info!(event_id = id, geocoded = coordinates.is_some(), "Updated event");
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let existing = self.get(id).await?;

        if db::events::delete(&self.pool, id).await? == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }
        self.discard(existing.file_path.as_deref()).await;

        info!(event_id = id, "Deleted event");
        Ok(())
    }

    async fn validate(&self, input: &EventInput, upload: Option<&Upload>) -> AppResult<()> {
        input.validate().map_err(AppError::ValidationError)?;

        if let Some(category_id) = input.category_id {
            if db::categories::find(&self.pool, category_id).await?.is_none() {
                return Err(AppError::ValidationError(format!(
                    "Category {} does not exist",
                    category_id
                )));
            }
        }

        if let Some(upload) = upload {
            self.attachments.check(upload)?;
        }

        Ok(())
    }

    /// Saves an already checked upload. Storage trouble never blocks the
    /// event itself, it only loses the attachment.
    async fn store(&self, upload: Option<&Upload>) -> Option<String> {
        let upload = upload?;
        match self.attachments.save(upload).await {
            Ok(name) => Some(name),
            Err(err) => {
                warn!(file = %upload.file_name, error = %err, "Attachment not stored");
                None
            }
        }
    }

    async fn discard(&self, file_path: Option<&str>) {
        let Some(name) = file_path else {
            return;
        };
        if let Err(err) = self.attachments.remove(name).await {
            warn!(file = %name, error = %err, "Failed to remove attachment");
        }
    }
}

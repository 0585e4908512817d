use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::event_query::{build_query, EventFilter, EVENT_SELECT};
use crate::geocoding::Coordinates;
use crate::models::event::non_empty;
use crate::models::{Event, EventInput};

/// Optional text is stored as NULL rather than as an empty string.
fn optional(value: &Option<String>) -> Option<String> {
    non_empty(value.as_deref()).map(str::to_string)
}

pub async fn list(pool: &SqlitePool, filter: &EventFilter) -> Result<Vec<Event>, sqlx::Error> {
    let mut query = build_query(filter);
    query.build_query_as::<Event>().fetch_all(pool).await
}

pub async fn find(pool: &SqlitePool, id: i64) -> Result<Option<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(&format!("{EVENT_SELECT} WHERE e.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Events that carry both coordinates, in start order.
pub async fn list_geocoded(pool: &SqlitePool) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(&format!(
        "{EVENT_SELECT} WHERE e.latitude IS NOT NULL AND e.longitude IS NOT NULL \
         ORDER BY e.start_datetime ASC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn insert<'e, E>(
    executor: E,
    input: &EventInput,
    coordinates: Option<Coordinates>,
    file_path: Option<&str>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO event (title, description, start_datetime, end_datetime, location_name, \
         street_name, street_number, postal_code, file_path, latitude, longitude, category_id, \
         created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(input.title.trim())
    .bind(optional(&input.description))
    .bind(input.start_datetime)
    .bind(input.end_datetime)
    .bind(optional(&input.address.location_name))
    .bind(optional(&input.address.street_name))
    .bind(optional(&input.address.street_number))
    .bind(optional(&input.address.postal_code))
    .bind(file_path)
    .bind(coordinates.map(|c| c.latitude))
    .bind(coordinates.map(|c| c.longitude))
    .bind(input.category_id)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrites every user field of an event. Returns the number of rows
/// touched, zero when the event does not exist.
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    input: &EventInput,
    coordinates: Option<Coordinates>,
    file_path: Option<&str>,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE event SET title = ?, description = ?, start_datetime = ?, end_datetime = ?, \
         location_name = ?, street_name = ?, street_number = ?, postal_code = ?, file_path = ?, \
         latitude = ?, longitude = ?, category_id = ? WHERE id = ?",
    )
    .bind(input.title.trim())
    .bind(optional(&input.description))
    .bind(input.start_datetime)
    .bind(input.end_datetime)
    .bind(optional(&input.address.location_name))
    .bind(optional(&input.address.street_name))
    .bind(optional(&input.address.street_number))
    .bind(optional(&input.address.postal_code))
    .bind(file_path)
    .bind(coordinates.map(|c| c.latitude))
    .bind(coordinates.map(|c| c.longitude))
    .bind(input.category_id)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM event WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

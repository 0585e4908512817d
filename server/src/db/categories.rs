use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{Category, CategoryInput};

pub async fn list(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM category ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Category>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM category WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn insert<'e, E>(executor: E, input: &CategoryInput) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("INSERT INTO category (name, description, created_at) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(&input.description)
            .bind(Utc::now())
            .execute(executor)
            .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update<'e, E>(executor: E, id: i64, input: &CategoryInput) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE category SET name = ?, description = ? WHERE id = ?")
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Detaches the category's events, then removes the category, in one
/// transaction. Returns the number of events that were detached, or `None`
/// when the category does not exist.
pub async fn delete_detaching_events(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<u64>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let detached = sqlx::query("UPDATE event SET category_id = NULL WHERE category_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;
    Ok(Some(detached))
}

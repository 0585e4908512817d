use sqlx::SqlitePool;
use tracing::info;

use crate::db::{self, is_unique_violation};
use crate::models::{Category, CategoryInput};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct CategoryService {
    pool: SqlitePool,
}

impl CategoryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Category>> {
        Ok(db::categories::list(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Category> {
        db::categories::find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    pub async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        let input = input.normalized();
        input.validate().map_err(AppError::ValidationError)?;

        // The UNIQUE constraint decides; a violation rolls the write back
        let mut tx = self.pool.begin().await?;
        let inserted = db::categories::insert(&mut *tx, &input).await;
        let id = match inserted {
            Ok(id) => id,
            Err(err) if is_unique_violation(&err) => {
                tx.rollback().await?;
                return Err(duplicate_name(&input.name));
            }
            Err(err) => return Err(err.into()),
        };
        tx.commit().await?;

        info!(category_id = id, name = %input.name, "Created category");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, input: CategoryInput) -> AppResult<Category> {
        let input = input.normalized();
        input.validate().map_err(AppError::ValidationError)?;

        let mut tx = self.pool.begin().await?;
        let updated = db::categories::update(&mut *tx, id, &input).await;
        let updated = match updated {
            Ok(rows) => rows,
            Err(err) if is_unique_violation(&err) => {
                tx.rollback().await?;
                return Err(duplicate_name(&input.name));
            }
            Err(err) => return Err(err.into()),
        };
        if updated == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        tx.commit().await?;

        info!(category_id = id, name = %input.name, "Updated category");
        self.get(id).await
    }

    /// Removes the category; its events stay and lose their category.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        match db::categories::delete_detaching_events(&self.pool, id).await? {
            Some(detached) => {
                info!(category_id = id, detached_events = detached, "Deleted category");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Category {} not found", id))),
        }
    }
}

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("A category named '{}' already exists", name))
}

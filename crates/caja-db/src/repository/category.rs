//! # Category Repository

use caja_core::validation::validate_product_name;
use caja_core::Category;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category. Names are unique.
    pub async fn insert(&self, name: &str) -> DbResult<Category> {
        validate_product_name(name).map_err(|e| DbError::Invalid(e.to_string()))?;
        debug!(name, "Inserting category");

        let now = Utc::now();
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?2)
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name.trim())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
            other => other,
        })?;

        Ok(category)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }
}

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::errors::{field_error, AppError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Faculty {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create/update input. Both operations share the same field checks.
#[derive(Debug, Clone, Deserialize)]
pub struct FacultyInput {
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Faculty>, AppError> {
    let rows = sqlx::query_as::<_, Faculty>(
        "SELECT id, name, abbreviation, created_at, updated_at FROM faculties ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Faculty>, AppError> {
    let row = sqlx::query_as::<_, Faculty>(
        "SELECT id, name, abbreviation, created_at, updated_at FROM faculties WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// A name collision is reported against the `name` field so the form can
/// show it inline; the other submitted fields stay as they were.
async fn check_name_free(
    pool: &SqlitePool,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let taken: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM faculties WHERE name = ?1 AND id != ?2",
    )
    .bind(name)
    .bind(exclude_id.unwrap_or(0))
    .fetch_one(pool)
    .await?;

    if taken {
        return Err(field_error("name", "already taken"));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, input: &FacultyInput) -> Result<i64, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(field_error("name", "is required"));
    }
    check_name_free(pool, name, None).await?;

    let result = sqlx::query("INSERT INTO faculties (name, abbreviation) VALUES (?1, ?2)")
        .bind(name)
        .bind(input.abbreviation.trim())
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &SqlitePool, id: i64, input: &FacultyInput) -> Result<(), AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(field_error("name", "is required"));
    }
    check_name_free(pool, name, Some(id)).await?;

    let result = sqlx::query(
        "UPDATE faculties SET name = ?1, abbreviation = ?2, updated_at = datetime('now') \
         WHERE id = ?3",
    )
    .bind(name)
    .bind(input.abbreviation.trim())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM faculties WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

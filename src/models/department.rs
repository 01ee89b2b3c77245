use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::errors::{field_error, AppError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Department {
    pub id: i64,
    pub faculty_id: i64,
    pub faculty_name: String,
    pub name: String,
    pub abbreviation: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInput {
    pub faculty_id: i64,
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

const SELECT_DEPARTMENT: &str = "\
    SELECT d.id, d.faculty_id, f.name AS faculty_name, d.name, d.abbreviation, \
           d.created_at, d.updated_at \
    FROM departments d JOIN faculties f ON f.id = d.faculty_id";

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Department>, AppError> {
    let sql = format!("{SELECT_DEPARTMENT} ORDER BY f.name, d.name");
    let rows = sqlx::query_as::<_, Department>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Department>, AppError> {
    let sql = format!("{SELECT_DEPARTMENT} WHERE d.id = ?1");
    let row = sqlx::query_as::<_, Department>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn validate_input(
    pool: &SqlitePool,
    input: &DepartmentInput,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(field_error("name", "is required"));
    }

    let faculty_exists: bool =
        sqlx::query_scalar("SELECT COUNT(*) > 0 FROM faculties WHERE id = ?1")
            .bind(input.faculty_id)
            .fetch_one(pool)
            .await?;
    if !faculty_exists {
        return Err(field_error("faculty_id", "unknown faculty"));
    }

    let taken: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM departments WHERE name = ?1 AND id != ?2",
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

pub async fn create(pool: &SqlitePool, input: &DepartmentInput) -> Result<i64, AppError> {
    validate_input(pool, input, None).await?;

    let result = sqlx::query(
        "INSERT INTO departments (faculty_id, name, abbreviation) VALUES (?1, ?2, ?3)",
    )
    .bind(input.faculty_id)
    .bind(input.name.trim())
    .bind(input.abbreviation.trim())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &SqlitePool, id: i64, input: &DepartmentInput) -> Result<(), AppError> {
    validate_input(pool, input, Some(id)).await?;

    let result = sqlx::query(
        "UPDATE departments SET faculty_id = ?1, name = ?2, abbreviation = ?3, \
         updated_at = datetime('now') WHERE id = ?4",
    )
    .bind(input.faculty_id)
    .bind(input.name.trim())
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
    let result = sqlx::query("DELETE FROM departments WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::errors::{field_error, AppError};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Program {
    pub id: i64,
    pub department_id: i64,
    pub department_name: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramInput {
    pub department_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

const SELECT_PROGRAM: &str = "\
    SELECT p.id, p.department_id, d.name AS department_name, p.name, p.description, \
           p.created_at, p.updated_at \
    FROM programs p JOIN departments d ON d.id = p.department_id";

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Program>, AppError> {
    let sql = format!("{SELECT_PROGRAM} ORDER BY d.name, p.name");
    let rows = sqlx::query_as::<_, Program>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Program>, AppError> {
    let sql = format!("{SELECT_PROGRAM} WHERE p.id = ?1");
    let row = sqlx::query_as::<_, Program>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn validate_input(pool: &SqlitePool, input: &ProgramInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(field_error("name", "is required"));
    }
    let department_exists: bool =
        sqlx::query_scalar("SELECT COUNT(*) > 0 FROM departments WHERE id = ?1")
            .bind(input.department_id)
            .fetch_one(pool)
            .await?;
    if !department_exists {
        return Err(field_error("department_id", "unknown department"));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, input: &ProgramInput) -> Result<i64, AppError> {
    validate_input(pool, input).await?;

    let result = sqlx::query(
        "INSERT INTO programs (department_id, name, description) VALUES (?1, ?2, ?3)",
    )
    .bind(input.department_id)
    .bind(input.name.trim())
    .bind(input.description.trim())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(pool: &SqlitePool, id: i64, input: &ProgramInput) -> Result<(), AppError> {
    validate_input(pool, input).await?;

    let result = sqlx::query(
        "UPDATE programs SET department_id = ?1, name = ?2, description = ?3, \
         updated_at = datetime('now') WHERE id = ?4",
    )
    .bind(input.department_id)
    .bind(input.name.trim())
    .bind(input.description.trim())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM programs WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::errors::{field_error, AppError};
use crate::models::role::Role;

/// Internal user struct for authentication — includes the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub faculty_id: Option<i64>,
    pub department_id: Option<i64>,
}

impl User {
    pub fn role(&self) -> Result<Role, AppError> {
        Role::parse(&self.role)
            .ok_or_else(|| AppError::BadRequest(format!("unknown role '{}'", self.role)))
    }
}

/// Safe projection for API responses — no password hash.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserDisplay {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub faculty_id: Option<i64>,
    pub department_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    pub role: String,
    #[serde(default)]
    pub faculty_id: Option<i64>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

const SELECT_DISPLAY: &str = "\
    SELECT id, username, email, display_name, role, faculty_id, department_id, \
           created_at, updated_at \
    FROM users";

pub async fn find_all_display(pool: &SqlitePool) -> Result<Vec<UserDisplay>, AppError> {
    let sql = format!("{SELECT_DISPLAY} ORDER BY username");
    let rows = sqlx::query_as::<_, UserDisplay>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_display_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserDisplay>, AppError> {
    let sql = format!("{SELECT_DISPLAY} WHERE id = ?1");
    let row = sqlx::query_as::<_, UserDisplay>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, User>(
        "SELECT id, username, password, email, display_name, role, faculty_id, department_id \
         FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, User>(
        "SELECT id, username, password, email, display_name, role, faculty_id, department_id \
         FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Create a user. `new_user.password` must already be an argon2 hash; the
/// role string is resolved through the closed enum before it is stored.
pub async fn create(pool: &SqlitePool, new_user: &NewUser) -> Result<i64, AppError> {
    let username = new_user.username.trim();
    if username.is_empty() {
        return Err(field_error("username", "is required"));
    }
    let role = Role::parse(&new_user.role).ok_or_else(|| field_error("role", "unknown role"))?;

    let taken: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM users WHERE username = ?1")
        .bind(username)
        .fetch_one(pool)
        .await?;
    if taken {
        return Err(field_error("username", "already taken"));
    }

    let result = sqlx::query(
        "INSERT INTO users (username, password, email, display_name, role, faculty_id, department_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(username)
    .bind(&new_user.password)
    .bind(new_user.email.trim())
    .bind(new_user.display_name.trim())
    .bind(role.as_str())
    .bind(new_user.faculty_id)
    .bind(new_user.department_id)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub faculty_id: Option<i64>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

pub async fn update(pool: &SqlitePool, id: i64, changes: &UpdateUser) -> Result<(), AppError> {
    let role = match &changes.role {
        Some(raw) => Some(Role::parse(raw).ok_or_else(|| field_error("role", "unknown role"))?),
        None => None,
    };

    let result = sqlx::query(
        "UPDATE users SET \
             email = COALESCE(?1, email), \
             display_name = COALESCE(?2, display_name), \
             role = COALESCE(?3, role), \
             faculty_id = COALESCE(?4, faculty_id), \
             department_id = COALESCE(?5, department_id), \
             updated_at = datetime('now') \
         WHERE id = ?6",
    )
    .bind(changes.email.as_deref().map(str::trim))
    .bind(changes.display_name.as_deref().map(str::trim))
    .bind(role.map(|r| r.as_str()))
    .bind(changes.faculty_id)
    .bind(changes.department_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::errors::AppError;

pub type DbPool = SqlitePool;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(MIGRATIONS).execute(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Seed the default admin account and the institution-wide reference
/// statements (missions, graduate attributes). Idempotent: skipped when
/// users already exist.
pub async fn seed_defaults(pool: &SqlitePool, admin_password_hash: &str) -> Result<(), AppError> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if user_count > 0 {
        log::info!("Database already seeded ({user_count} users), skipping");
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO users (username, password, email, display_name, role) \
         VALUES ('admin', ?1, 'admin@localhost', 'Administrator', 'admin')",
    )
    .bind(admin_password_hash)
    .execute(pool)
    .await?;

    for statement in [
        "Provide quality instruction grounded in outcome-based education",
        "Conduct research that serves the surrounding community",
        "Extend professional services to industry and government",
    ] {
        sqlx::query("INSERT INTO missions (statement) VALUES (?1)")
            .bind(statement)
            .execute(pool)
            .await?;
    }

    for statement in [
        "Engineering knowledge",
        "Problem analysis",
        "Design and development of solutions",
        "Communication",
        "Ethics",
        "Lifelong learning",
    ] {
        sqlx::query("INSERT INTO graduate_attributes (statement) VALUES (?1)")
            .bind(statement)
            .execute(pool)
            .await?;
    }

    log::info!("Default seed complete");
    Ok(())
}

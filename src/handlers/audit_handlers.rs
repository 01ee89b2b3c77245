use actix_session::Session;
use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use crate::auth::session::{current_user, require_admin};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;

/// GET /admin/audit?limit=100
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let limit = query
        .get("limit")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(100);
    Ok(data(crate::audit::recent(&pool, limit).await?))
}

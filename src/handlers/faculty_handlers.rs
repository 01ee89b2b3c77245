use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::{current_user, require_admin};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::faculty::{self, FacultyInput};

/// GET /admin/faculties
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;
    Ok(data(faculty::find_all(&pool).await?))
}

/// POST /admin/faculties
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<FacultyInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let id = faculty::create(&pool, &body).await?;
    let _ = crate::audit::log(
        &pool,
        user.id,
        "faculty.created",
        "faculty",
        id,
        serde_json::json!({ "name": body.name.trim() }),
    )
    .await;

    Ok(data(faculty::find_by_id(&pool, id).await?))
}

/// PUT /admin/faculties/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<FacultyInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let id = path.into_inner();
    faculty::update(&pool, id, &body).await?;
    let _ = crate::audit::log(
        &pool,
        user.id,
        "faculty.updated",
        "faculty",
        id,
        serde_json::json!({ "name": body.name.trim() }),
    )
    .await;

    Ok(data(faculty::find_by_id(&pool, id).await?))
}

/// DELETE /admin/faculties/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let id = path.into_inner();
    faculty::delete(&pool, id).await?;
    let _ = crate::audit::log(&pool, user.id, "faculty.deleted", "faculty", id, serde_json::json!({})).await;

    Ok(data(serde_json::json!({ "deleted": id })))
}

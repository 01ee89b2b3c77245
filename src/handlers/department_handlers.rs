use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::{current_user, require_admin};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::department::{self, DepartmentInput};

/// GET /admin/departments
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;
    Ok(data(department::find_all(&pool).await?))
}

/// POST /admin/departments
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let id = department::create(&pool, &body).await?;
    let _ = crate::audit::log(
        &pool,
        user.id,
        "department.created",
        "department",
        id,
        serde_json::json!({ "name": body.name.trim(), "faculty_id": body.faculty_id }),
    )
    .await;

    Ok(data(department::find_by_id(&pool, id).await?))
}

/// PUT /admin/departments/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<DepartmentInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let id = path.into_inner();
    department::update(&pool, id, &body).await?;
    let _ = crate::audit::log(
        &pool,
        user.id,
        "department.updated",
        "department",
        id,
        serde_json::json!({ "name": body.name.trim() }),
    )
    .await;

    Ok(data(department::find_by_id(&pool, id).await?))
}

/// DELETE /admin/departments/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;

    let id = path.into_inner();
    department::delete(&pool, id).await?;
    let _ = crate::audit::log(&pool, user.id, "department.deleted", "department", id, serde_json::json!({})).await;

    Ok(data(serde_json::json!({ "deleted": id })))
}

use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::current_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::program::{self, ProgramInput};
use crate::models::role::Role;

fn require_program_manager(role: Role) -> Result<(), AppError> {
    if matches!(role, Role::Admin | Role::Dean) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied("admin or dean only".into()))
    }
}

/// GET /admin/programs (also readable by deans)
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_program_manager(user.role)?;
    Ok(data(program::find_all(&pool).await?))
}

/// POST /admin/programs
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ProgramInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_program_manager(user.role)?;

    let id = program::create(&pool, &body).await?;
    let _ = crate::audit::log(
        &pool,
        user.id,
        "program.created",
        "program",
        id,
        serde_json::json!({ "name": body.name.trim(), "department_id": body.department_id }),
    )
    .await;

    Ok(data(program::find_by_id(&pool, id).await?))
}

/// PUT /admin/programs/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ProgramInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_program_manager(user.role)?;

    let id = path.into_inner();
    program::update(&pool, id, &body).await?;
    let _ = crate::audit::log(&pool, user.id, "program.updated", "program", id, serde_json::json!({})).await;

    Ok(data(program::find_by_id(&pool, id).await?))
}

/// DELETE /admin/programs/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_program_manager(user.role)?;

    let id = path.into_inner();
    program::delete(&pool, id).await?;
    let _ = crate::audit::log(&pool, user.id, "program.deleted", "program", id, serde_json::json!({})).await;

    Ok(data(serde_json::json!({ "deleted": id })))
}

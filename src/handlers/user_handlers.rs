use actix_session::Session;
use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use crate::auth::password;
use crate::auth::session::{current_user, require_admin};
use crate::auth::validate::{validate_password, validate_username};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::user::{self, NewUser, UpdateUser};

/// GET /admin/users
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    require_admin(&user)?;
    Ok(data(user::find_all_display(&pool).await?))
}

/// POST /admin/users
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<NewUser>,
) -> Result<HttpResponse, AppError> {
    let admin = current_user(&session)?;
    require_admin(&admin)?;

    let mut errors: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(msg) = validate_username(&body.username) {
        errors.entry("username".into()).or_default().push(msg);
    }
    if let Some(msg) = validate_password(&body.password) {
        errors.entry("password".into()).or_default().push(msg);
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let hash = password::hash_password(&body.password)?;
    let new_user = NewUser {
        password: hash,
        ..body.into_inner()
    };
    let id = user::create(&pool, &new_user).await?;
    let _ = crate::audit::log(
        &pool,
        admin.id,
        "user.created",
        "user",
        id,
        serde_json::json!({ "username": new_user.username.trim(), "role": new_user.role }),
    )
    .await;

    Ok(data(user::find_display_by_id(&pool, id).await?))
}

/// PUT /admin/users/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<UpdateUser>,
) -> Result<HttpResponse, AppError> {
    let admin = current_user(&session)?;
    require_admin(&admin)?;

    let id = path.into_inner();
    user::update(&pool, id, &body).await?;
    let _ = crate::audit::log(&pool, admin.id, "user.updated", "user", id, serde_json::json!({})).await;

    Ok(data(user::find_display_by_id(&pool, id).await?))
}

/// DELETE /admin/users/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let admin = current_user(&session)?;
    require_admin(&admin)?;

    let id = path.into_inner();
    if id == admin.id {
        return Err(AppError::BadRequest("cannot delete your own account".into()));
    }
    user::delete(&pool, id).await?;
    let _ = crate::audit::log(&pool, admin.id, "user.deleted", "user", id, serde_json::json!({})).await;

    Ok(data(serde_json::json!({ "deleted": id })))
}

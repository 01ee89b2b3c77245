use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::{current_user, require_role_scope};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::dashboard;
use crate::models::role::Role;

/// GET /{role}/dashboard
pub async fn index(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = Role::parse(&path.into_inner()).ok_or(AppError::NotFound)?;
    let user = current_user(&session)?;
    require_role_scope(&user, scope)?;

    Ok(data(dashboard::counts(&pool, user.role).await?))
}

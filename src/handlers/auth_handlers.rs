use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::password;
use crate::auth::session::{current_user, store_user, SessionUser};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::user;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login
pub async fn login(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let found = user::find_by_username(&pool, form.username.trim()).await?;

    let Some(account) = found else {
        return Err(AppError::Session("invalid credentials".into()));
    };
    let ok = password::verify_password(&form.password, &account.password)?;
    if !ok {
        return Err(AppError::Session("invalid credentials".into()));
    }

    let role = account.role()?;
    session.renew();
    let session_user = SessionUser {
        id: account.id,
        username: account.username.clone(),
        role,
        faculty_id: account.faculty_id,
        department_id: account.department_id,
    };
    store_user(&session, &session_user)?;

    log::info!("User '{}' logged in as {role}", account.username);
    Ok(data(serde_json::json!({
        "id": account.id,
        "username": account.username,
        "role": role,
    })))
}

/// POST /logout
pub async fn logout(session: Session) -> Result<HttpResponse, AppError> {
    session.purge();
    Ok(data(serde_json::json!({ "logged_out": true })))
}

/// GET /me
pub async fn me(session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session)?;
    Ok(data(serde_json::json!({
        "id": user.id,
        "username": user.username,
        "role": user.role,
        "faculty_id": user.faculty_id,
        "department_id": user.department_id,
    })))
}

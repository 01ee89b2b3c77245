use actix_session::Session;

use crate::errors::AppError;
use crate::models::role::Role;

/// The authenticated caller, resolved once per request from the session.
/// Handlers and model calls take this explicitly; nothing reads raw
/// session keys past this point.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub faculty_id: Option<i64>,
    pub department_id: Option<i64>,
}

pub fn store_user(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session
        .insert("user_id", user.id)
        .and_then(|_| session.insert("username", user.username.clone()))
        .and_then(|_| session.insert("role", user.role.as_str()))
        .and_then(|_| session.insert("faculty_id", user.faculty_id))
        .and_then(|_| session.insert("department_id", user.department_id))
        .map_err(|e| AppError::Session(e.to_string()))
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

/// Resolve the full session user. The stored role string goes through
/// `Role::parse` exactly once, here.
pub fn current_user(session: &Session) -> Result<SessionUser, AppError> {
    let id = get_user_id(session).ok_or_else(|| AppError::Session("not logged in".into()))?;
    let username = session
        .get::<String>("username")
        .map_err(|e| AppError::Session(e.to_string()))?
        .ok_or_else(|| AppError::Session("no username in session".into()))?;
    let raw_role = session
        .get::<String>("role")
        .map_err(|e| AppError::Session(e.to_string()))?
        .ok_or_else(|| AppError::Session("no role in session".into()))?;
    let role = Role::parse(&raw_role)
        .ok_or_else(|| AppError::Session(format!("unresolvable role '{raw_role}'")))?;
    let faculty_id = session.get::<Option<i64>>("faculty_id").unwrap_or(None).flatten();
    let department_id = session
        .get::<Option<i64>>("department_id")
        .unwrap_or(None)
        .flatten();

    Ok(SessionUser {
        id,
        username,
        role,
        faculty_id,
        department_id,
    })
}

/// Check that the path's role scope matches the session role. A mismatch
/// is a permission error, not a redirect.
pub fn require_role_scope(user: &SessionUser, scope: Role) -> Result<(), AppError> {
    if user.role == scope {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "role '{}' cannot access the '{}' scope",
            user.role, scope
        )))
    }
}

pub fn require_admin(user: &SessionUser) -> Result<(), AppError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::PermissionDenied("admin only".into()))
    }
}

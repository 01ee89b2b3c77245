use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::{current_user, require_role_scope, SessionUser};
use crate::cache::{Cache, CacheKey, CachedEntity};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::data;
use crate::models::proposal::{self, ProposalStatus, ProposalUpdate};
use crate::models::revision::{
    group_course_revisions, group_department_revisions, queries as revision_queries,
};
use crate::models::role::Role;

fn parse_scope(raw: &str) -> Result<Role, AppError> {
    Role::parse(raw).ok_or(AppError::NotFound)
}

/// Per-proposal scoping, mirroring the list scoping: deans are confined
/// to their faculty, department and committee users to their department.
async fn require_ownership(
    pool: &DbPool,
    user: &SessionUser,
    proposal_id: i64,
) -> Result<(), AppError> {
    proposal::require_scope(pool, proposal_id, user.role, user.faculty_id, user.department_id)
        .await
}

/// GET /{role}/program-proposals
pub async fn list(
    pool: web::Data<DbPool>,
    cache: web::Data<Cache>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = parse_scope(&path.into_inner())?;
    let user = current_user(&session)?;
    require_role_scope(&user, scope)?;

    let key = CacheKey {
        entity: CachedEntity::ProposalList,
        role: user.role,
        id: user.department_id.or(user.faculty_id),
    };
    if let Some(cached) = cache.get(&key) {
        return Ok(data(cached));
    }

    let items =
        proposal::list_for_role(&pool, user.role, user.faculty_id, user.department_id).await?;
    let value = serde_json::to_value(&items)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    cache.put(key, value.clone());
    Ok(data(value))
}

/// GET /{role}/program-proposals/{id}
pub async fn detail(
    pool: web::Data<DbPool>,
    cache: web::Data<Cache>,
    session: Session,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, AppError> {
    let (scope, proposal_id) = path.into_inner();
    let scope = parse_scope(&scope)?;
    let user = current_user(&session)?;
    require_role_scope(&user, scope)?;
    require_ownership(&pool, &user, proposal_id).await?;

    let key = CacheKey {
        entity: CachedEntity::ProposalDetail,
        role: user.role,
        id: Some(proposal_id),
    };
    if let Some(cached) = cache.get(&key) {
        return Ok(data(cached));
    }

    let response = proposal::find_response(&pool, proposal_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let value = serde_json::to_value(&response)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    cache.put(key, value.clone());
    Ok(data(value))
}

/// PUT /{role}/program-proposals/{id}
///
/// Reviewer roles send a status transition (optionally carrying revision
/// requests); the owning department sends a revision submission payload.
/// Either way this is the single write of the submit action — the cache is
/// invalidated and the client refetches, no speculative merge.
pub async fn update(
    pool: web::Data<DbPool>,
    cache: web::Data<Cache>,
    session: Session,
    path: web::Path<(String, i64)>,
    body: web::Json<ProposalUpdate>,
) -> Result<HttpResponse, AppError> {
    let (scope, proposal_id) = path.into_inner();
    let scope = parse_scope(&scope)?;
    let user = current_user(&session)?;
    require_role_scope(&user, scope)?;
    require_ownership(&pool, &user, proposal_id).await?;

    match body.into_inner() {
        ProposalUpdate::Status(change) => {
            if !user.role.is_reviewer() {
                return Err(AppError::PermissionDenied(
                    "only reviewer roles may change proposal status".into(),
                ));
            }
            if change.status == ProposalStatus::Active && user.role != Role::Admin {
                return Err(AppError::PermissionDenied(
                    "only an admin may activate a program".into(),
                ));
            }
            proposal::update_status(&pool, proposal_id, &change).await?;

            let details = serde_json::json!({
                "status": change.status,
                "revision_items": change.revisions.len() + change.course_revisions.len(),
            });
            let _ = crate::audit::log(&pool, user.id, "proposal.status", "program_proposal", proposal_id, details).await;

            cache.invalidate_proposal(proposal_id);
            Ok(data(serde_json::json!({ "id": proposal_id, "status": change.status })))
        }
        ProposalUpdate::Revisions(payload) => {
            if user.role != Role::Department {
                return Err(AppError::PermissionDenied(
                    "only the owning department may submit revisions".into(),
                ));
            }
            let sections = payload.sections();
            let new_version = proposal::apply_submission(&pool, proposal_id, &payload).await?;

            let details = serde_json::json!({
                "version": new_version,
                "sections": sections,
            });
            let _ = crate::audit::log(&pool, user.id, "proposal.revised", "program_proposal", proposal_id, details).await;

            cache.invalidate_proposal(proposal_id);
            Ok(data(serde_json::json!({ "id": proposal_id, "version": new_version })))
        }
    }
}

/// GET /{role}/program-proposals/{id}/revisions
///
/// Committee (faculty-role) callers get course-level revision groups;
/// everyone else gets the department-level view.
pub async fn revisions(
    pool: web::Data<DbPool>,
    cache: web::Data<Cache>,
    session: Session,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, AppError> {
    let (scope, proposal_id) = path.into_inner();
    let scope = parse_scope(&scope)?;
    let user = current_user(&session)?;
    require_role_scope(&user, scope)?;
    require_ownership(&pool, &user, proposal_id).await?;

    let key = CacheKey {
        entity: CachedEntity::ProposalRevisions,
        role: user.role,
        id: Some(proposal_id),
    };
    if let Some(cached) = cache.get(&key) {
        return Ok(data(cached));
    }

    let value = if user.role == Role::Faculty {
        let items = revision_queries::find_course_revisions_for_proposal(&pool, proposal_id).await?;
        serde_json::to_value(group_course_revisions(items))
    } else {
        let items = revision_queries::find_for_proposal(&pool, proposal_id).await?;
        serde_json::to_value(group_department_revisions(items))
    }
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    cache.put(key, value.clone());
    Ok(data(value))
}

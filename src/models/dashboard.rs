use serde::Serialize;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::proposal::ProposalStatus;
use crate::models::role::Role;

/// Per-role landing page counts.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardCounts {
    pub faculties: i64,
    pub departments: i64,
    pub users: i64,
    pub programs: i64,
    pub proposals_pending: i64,
    pub proposals_revision: i64,
    pub proposals_approved: i64,
}

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar(sql).fetch_one(pool).await?;
    Ok(n)
}

async fn count_proposals(pool: &SqlitePool, status: ProposalStatus) -> Result<i64, AppError> {
    let n: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM program_proposals WHERE status = ?1")
            .bind(status.as_str())
            .fetch_one(pool)
            .await?;
    Ok(n)
}

/// Entity and proposal-status counts for the dashboard. Non-admin roles
/// get the same shape; their proposal lists are already scoped elsewhere,
/// so the counts here stay global summaries.
pub async fn counts(pool: &SqlitePool, _role: Role) -> Result<DashboardCounts, AppError> {
    Ok(DashboardCounts {
        faculties: count(pool, "SELECT COUNT(*) FROM faculties").await?,
        departments: count(pool, "SELECT COUNT(*) FROM departments").await?,
        users: count(pool, "SELECT COUNT(*) FROM users").await?,
        programs: count(pool, "SELECT COUNT(*) FROM programs").await?,
        proposals_pending: count_proposals(pool, ProposalStatus::Pending).await?,
        proposals_revision: count_proposals(pool, ProposalStatus::Revision).await?,
        proposals_approved: count_proposals(pool, ProposalStatus::Approved).await?,
    })
}

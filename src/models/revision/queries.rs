use sqlx::SqlitePool;

use crate::errors::AppError;

use super::section::{CommitteeSection, DeptSection};
use super::types::{CourseRevisionItem, RevisionItem};

#[derive(sqlx::FromRow)]
struct RevisionRow {
    id: i64,
    section: String,
    details: String,
    created_at: String,
    version: i64,
}

#[derive(sqlx::FromRow)]
struct CourseRevisionRow {
    id: i64,
    curriculum_course_id: i64,
    course_code: String,
    course_title: String,
    section: String,
    details: String,
    created_at: String,
    version: i64,
}

/// All department-level revision items for a proposal, flat. Rows with a
/// section tag outside the closed enumeration are treated as data
/// corruption and rejected.
pub async fn find_for_proposal(
    pool: &SqlitePool,
    proposal_id: i64,
) -> Result<Vec<RevisionItem>, AppError> {
    let rows = sqlx::query_as::<_, RevisionRow>(
        "SELECT id, section, details, created_at, version \
         FROM revision_items WHERE proposal_id = ?1",
    )
    .bind(proposal_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            let section = DeptSection::parse(&r.section)
                .ok_or_else(|| AppError::BadRequest(format!("unknown section '{}'", r.section)))?;
            Ok(RevisionItem {
                id: r.id,
                section,
                details: r.details,
                created_at: r.created_at,
                version: r.version,
            })
        })
        .collect()
}

/// All committee-level revision items for a proposal, flat, with the
/// targeted course's code and title joined in for grouping.
pub async fn find_course_revisions_for_proposal(
    pool: &SqlitePool,
    proposal_id: i64,
) -> Result<Vec<CourseRevisionItem>, AppError> {
    let rows = sqlx::query_as::<_, CourseRevisionRow>(
        "SELECT cr.id, cr.curriculum_course_id, cc.code AS course_code, \
                cc.title AS course_title, cr.section, cr.details, \
                cr.created_at, cr.version \
         FROM course_revision_items cr \
         JOIN curriculum_courses cc ON cc.id = cr.curriculum_course_id \
         WHERE cr.proposal_id = ?1",
    )
    .bind(proposal_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|r| {
            let section = CommitteeSection::parse(&r.section)
                .ok_or_else(|| AppError::BadRequest(format!("unknown section '{}'", r.section)))?;
            Ok(CourseRevisionItem {
                id: r.id,
                curriculum_course_id: r.curriculum_course_id,
                course_code: r.course_code,
                course_title: r.course_title,
                section,
                details: r.details,
                created_at: r.created_at,
                version: r.version,
            })
        })
        .collect()
}

/// Record one department-level change request at the given version.
/// Append-only by construction: there is no update or delete path. Takes
/// any executor so callers can append inside an open transaction.
pub async fn append_revision_item<'e, E>(
    executor: E,
    proposal_id: i64,
    section: DeptSection,
    details: &str,
    version: i64,
) -> Result<i64, AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO revision_items (proposal_id, section, details, version) \
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(proposal_id)
    .bind(section.as_str())
    .bind(details)
    .bind(version)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Record one committee-level change request against a curriculum course.
pub async fn append_course_revision_item<'e, E>(
    executor: E,
    proposal_id: i64,
    curriculum_course_id: i64,
    section: CommitteeSection,
    details: &str,
    version: i64,
) -> Result<i64, AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO course_revision_items \
         (proposal_id, curriculum_course_id, section, details, version) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(proposal_id)
    .bind(curriculum_course_id)
    .bind(section.as_str())
    .bind(details)
    .bind(version)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::revision::{
    self, queries as revision_queries, DeptSection, MappingEdit, ProposalSnapshot,
    SubmitRevisionsPayload,
};
use crate::models::role::Role;

use super::types::*;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ProgramProposal>, AppError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        program_id: i64,
        status: String,
        version: i64,
        comment: String,
        created_at: String,
        updated_at: String,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT id, program_id, status, version, comment, created_at, updated_at \
         FROM program_proposals WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| {
        let status = ProposalStatus::parse(&r.status)
            .ok_or_else(|| AppError::BadRequest(format!("unknown status '{}'", r.status)))?;
        Ok(ProgramProposal {
            id: r.id,
            program_id: r.program_id,
            status,
            version: r.version,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    })
    .transpose()
}

/// Role-scoped proposal list. Admins see everything; deans see their
/// faculty's programs; department and committee (faculty-role) users see
/// their own department's.
pub async fn list_for_role(
    pool: &SqlitePool,
    role: Role,
    faculty_id: Option<i64>,
    department_id: Option<i64>,
) -> Result<Vec<ProposalListItem>, AppError> {
    let base = "SELECT pp.id, pp.program_id, pr.name AS program_name, \
                       d.id AS department_id, d.name AS department_name, \
                       pp.status, pp.version, pp.updated_at \
                FROM program_proposals pp \
                JOIN programs pr ON pr.id = pp.program_id \
                JOIN departments d ON d.id = pr.department_id";

    let items = match role {
        Role::Admin => {
            let sql = format!("{base} ORDER BY pp.updated_at DESC, pp.id DESC");
            sqlx::query_as::<_, ProposalListItem>(&sql).fetch_all(pool).await?
        }
        Role::Dean => {
            let fid = faculty_id.ok_or(AppError::PermissionDenied("no faculty scope".into()))?;
            let sql = format!("{base} WHERE d.faculty_id = ?1 ORDER BY pp.updated_at DESC, pp.id DESC");
            sqlx::query_as::<_, ProposalListItem>(&sql)
                .bind(fid)
                .fetch_all(pool)
                .await?
        }
        Role::Department | Role::Faculty => {
            let did =
                department_id.ok_or(AppError::PermissionDenied("no department scope".into()))?;
            let sql = format!("{base} WHERE d.id = ?1 ORDER BY pp.updated_at DESC, pp.id DESC");
            sqlx::query_as::<_, ProposalListItem>(&sql)
                .bind(did)
                .fetch_all(pool)
                .await?
        }
    };

    Ok(items)
}

/// Single-proposal counterpart of the `list_for_role` scoping: admins may
/// touch any proposal, deans only their faculty's, department and
/// committee (faculty-role) users only their department's.
pub async fn require_scope(
    pool: &SqlitePool,
    proposal_id: i64,
    role: Role,
    faculty_id: Option<i64>,
    department_id: Option<i64>,
) -> Result<(), AppError> {
    #[derive(sqlx::FromRow)]
    struct ScopeRow {
        department_id: i64,
        faculty_id: i64,
    }

    let row = sqlx::query_as::<_, ScopeRow>(
        "SELECT d.id AS department_id, d.faculty_id \
         FROM program_proposals pp \
         JOIN programs pr ON pr.id = pp.program_id \
         JOIN departments d ON d.id = pr.department_id \
         WHERE pp.id = ?1",
    )
    .bind(proposal_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)?;

    let allowed = match role {
        Role::Admin => true,
        Role::Dean => faculty_id == Some(row.faculty_id),
        Role::Department | Role::Faculty => department_id == Some(row.department_id),
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "proposal outside your faculty or department scope".into(),
        ))
    }
}

/// Full nested detail for one proposal: program, PEOs/POs, the mapping
/// tables, and the curriculum grid with categories and courses.
pub async fn find_response(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<ProgramProposalResponse>, AppError> {
    let Some(proposal) = find_by_id(pool, id).await? else {
        return Ok(None);
    };

    #[derive(sqlx::FromRow)]
    struct ProgramRow {
        name: String,
        department_id: i64,
    }
    let program = sqlx::query_as::<_, ProgramRow>(
        "SELECT name, department_id FROM programs WHERE id = ?1",
    )
    .bind(proposal.program_id)
    .fetch_one(pool)
    .await?;

    let peos = sqlx::query_as::<_, PeoRow>(
        "SELECT id, statement, position FROM proposal_peos \
         WHERE proposal_id = ?1 ORDER BY position, id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let pos = sqlx::query_as::<_, PoRow>(
        "SELECT id, statement, position FROM proposal_pos \
         WHERE proposal_id = ?1 ORDER BY position, id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let peo_mission_mappings = fetch_mappings(pool, id, DeptSection::PeoMissionMappings).await?;
    let ga_peo_mappings = fetch_mappings(pool, id, DeptSection::GaPeoMappings).await?;
    let po_peo_mappings = fetch_mappings(pool, id, DeptSection::PoPeoMappings).await?;
    let po_ga_mappings = fetch_mappings(pool, id, DeptSection::PoGaMappings).await?;
    let course_po_mappings = fetch_mappings(pool, id, DeptSection::CoursePoMappings).await?;

    #[derive(sqlx::FromRow)]
    struct CurriculumRow {
        id: i64,
        name: String,
        effective_year: Option<i64>,
    }
    let curriculum_row = sqlx::query_as::<_, CurriculumRow>(
        "SELECT id, name, effective_year FROM proposal_curriculums WHERE proposal_id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let curriculum = match curriculum_row {
        Some(c) => {
            let categories = sqlx::query_as::<_, CategoryRow>(
                "SELECT id, name FROM course_categories WHERE proposal_id = ?1 ORDER BY id",
            )
            .bind(id)
            .fetch_all(pool)
            .await?;

            let courses = sqlx::query_as::<_, CurriculumCourseRow>(
                "SELECT id, code, title, units, year, semester, category_id \
                 FROM curriculum_courses WHERE proposal_id = ?1 \
                 ORDER BY year, semester, code",
            )
            .bind(id)
            .fetch_all(pool)
            .await?;

            Some(CurriculumDetail {
                id: c.id,
                name: c.name,
                effective_year: c.effective_year,
                categories,
                courses,
            })
        }
        None => None,
    };

    Ok(Some(ProgramProposalResponse {
        id: proposal.id,
        program_id: proposal.program_id,
        program_name: program.name,
        department_id: program.department_id,
        status: proposal.status,
        version: proposal.version,
        comment: proposal.comment,
        created_at: proposal.created_at,
        updated_at: proposal.updated_at,
        peos,
        pos,
        peo_mission_mappings,
        ga_peo_mappings,
        po_peo_mappings,
        po_ga_mappings,
        course_po_mappings,
        curriculum,
    }))
}

async fn fetch_mappings(
    pool: &SqlitePool,
    proposal_id: i64,
    section: DeptSection,
) -> Result<Vec<MappingRow>, AppError> {
    let rows = sqlx::query_as::<_, MappingRow>(
        "SELECT id, source_id, target_id, level FROM proposal_mappings \
         WHERE proposal_id = ?1 AND section = ?2 ORDER BY id",
    )
    .bind(proposal_id)
    .bind(section.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Identifier sets a revision submission is validated against.
pub async fn snapshot(pool: &SqlitePool, proposal_id: i64) -> Result<ProposalSnapshot, AppError> {
    async fn ids(
        pool: &SqlitePool,
        sql: &str,
        proposal_id: Option<i64>,
    ) -> Result<std::collections::HashSet<i64>, AppError> {
        let query = sqlx::query_scalar::<_, i64>(sql);
        let rows = match proposal_id {
            Some(id) => query.bind(id).fetch_all(pool).await?,
            None => query.fetch_all(pool).await?,
        };
        Ok(rows.into_iter().collect())
    }

    Ok(ProposalSnapshot {
        peo_ids: ids(pool, "SELECT id FROM proposal_peos WHERE proposal_id = ?1", Some(proposal_id)).await?,
        po_ids: ids(pool, "SELECT id FROM proposal_pos WHERE proposal_id = ?1", Some(proposal_id)).await?,
        ga_ids: ids(pool, "SELECT id FROM graduate_attributes", None).await?,
        mission_ids: ids(pool, "SELECT id FROM missions", None).await?,
        category_ids: ids(pool, "SELECT id FROM course_categories WHERE proposal_id = ?1", Some(proposal_id)).await?,
        course_ids: ids(pool, "SELECT id FROM curriculum_courses WHERE proposal_id = ?1", Some(proposal_id)).await?,
    })
}

/// Apply a reviewer status transition. Illegal transitions are rejected;
/// a `revision` transition records the reviewer's change requests as
/// append-only items stamped with the proposal's current version. The
/// status flip and the item inserts commit together or not at all, so a
/// proposal can never end up in `revision` with no items behind it.
pub async fn update_status(
    pool: &SqlitePool,
    proposal_id: i64,
    change: &StatusChange,
) -> Result<(), AppError> {
    let proposal = find_by_id(pool, proposal_id).await?.ok_or(AppError::NotFound)?;

    if !proposal.status.can_transition_to(change.status) {
        return Err(AppError::BadRequest(format!(
            "cannot move proposal from '{}' to '{}'",
            proposal.status.as_str(),
            change.status.as_str()
        )));
    }

    if change.status == ProposalStatus::Revision
        && change.revisions.is_empty()
        && change.course_revisions.is_empty()
    {
        return Err(AppError::BadRequest(
            "a revision request needs at least one revision item".into(),
        ));
    }

    if !change.course_revisions.is_empty() {
        let course_ids: std::collections::HashSet<i64> = sqlx::query_scalar(
            "SELECT id FROM curriculum_courses WHERE proposal_id = ?1",
        )
        .bind(proposal_id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();

        let mut errors: std::collections::HashMap<String, Vec<String>> =
            std::collections::HashMap::new();
        for (i, req) in change.course_revisions.iter().enumerate() {
            if !course_ids.contains(&req.curriculum_course_id) {
                errors
                    .entry(format!("course_revisions[{i}].curriculum_course_id"))
                    .or_default()
                    .push("unknown identifier".to_string());
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE program_proposals \
         SET status = ?1, comment = ?2, updated_at = datetime('now') WHERE id = ?3",
    )
    .bind(change.status.as_str())
    .bind(change.comment.as_deref().unwrap_or(""))
    .bind(proposal_id)
    .execute(&mut *tx)
    .await?;

    for req in &change.revisions {
        revision_queries::append_revision_item(
            &mut *tx,
            proposal_id,
            req.section,
            &req.details,
            proposal.version,
        )
        .await?;
    }
    for req in &change.course_revisions {
        revision_queries::append_course_revision_item(
            &mut *tx,
            proposal_id,
            req.curriculum_course_id,
            req.section,
            &req.details,
            proposal.version,
        )
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Apply a department's revision submission in one transaction: each
/// present section's collection becomes authoritative (rows with ids are
/// updated, rows without are inserted, missing rows are deleted), then the
/// version counter moves and the proposal returns to `pending` review.
pub async fn apply_submission(
    pool: &SqlitePool,
    proposal_id: i64,
    payload: &SubmitRevisionsPayload,
) -> Result<i64, AppError> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("empty revision submission".into()));
    }

    let proposal = find_by_id(pool, proposal_id).await?.ok_or(AppError::NotFound)?;
    if proposal.status != ProposalStatus::Revision {
        return Err(AppError::BadRequest(format!(
            "proposal is '{}', only proposals under revision accept submissions",
            proposal.status.as_str()
        )));
    }

    let snapshot = snapshot(pool, proposal_id).await?;
    revision::assemble::validate_payload(payload, &snapshot)?;

    let mut tx = pool.begin().await?;

    if let Some(d) = &payload.program {
        sqlx::query(
            "UPDATE programs SET name = ?1, \
             description = COALESCE(?2, description), \
             updated_at = datetime('now') WHERE id = ?3",
        )
        .bind(d.name.trim())
        .bind(d.description.as_deref())
        .bind(proposal.program_id)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(d) = &payload.curriculum {
        sqlx::query(
            "INSERT INTO proposal_curriculums (proposal_id, name, effective_year) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(proposal_id) DO UPDATE SET \
                 name = excluded.name, effective_year = excluded.effective_year",
        )
        .bind(proposal_id)
        .bind(d.name.trim())
        .bind(d.effective_year)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(rows) = &payload.peos {
        apply_statement_rows(&mut tx, "proposal_peos", proposal_id, rows).await?;
    }
    if let Some(rows) = &payload.pos {
        apply_statement_rows(&mut tx, "proposal_pos", proposal_id, rows).await?;
    }

    if let Some(rows) = &payload.course_categories {
        let kept: Vec<i64> = rows.iter().filter_map(|r| r.id).collect();
        delete_missing(&mut tx, "course_categories", proposal_id, &kept).await?;
        for row in rows {
            match row.id {
                Some(id) => {
                    sqlx::query("UPDATE course_categories SET name = ?1 WHERE id = ?2 AND proposal_id = ?3")
                        .bind(row.name.trim())
                        .bind(id)
                        .bind(proposal_id)
                        .execute(&mut *tx)
                        .await?;
                }
                None => {
                    sqlx::query("INSERT INTO course_categories (proposal_id, name) VALUES (?1, ?2)")
                        .bind(proposal_id)
                        .bind(row.name.trim())
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }
    }

    if let Some(rows) = &payload.curriculum_courses {
        let kept: Vec<i64> = rows.iter().filter_map(|r| r.id).collect();
        delete_missing(&mut tx, "curriculum_courses", proposal_id, &kept).await?;
        for row in rows {
            match row.id {
                Some(id) => {
                    sqlx::query(
                        "UPDATE curriculum_courses \
                         SET code = ?1, title = ?2, units = ?3, year = ?4, \
                             semester = ?5, category_id = ?6 \
                         WHERE id = ?7 AND proposal_id = ?8",
                    )
                    .bind(row.code.trim())
                    .bind(row.title.trim())
                    .bind(row.units)
                    .bind(row.year)
                    .bind(row.semester)
                    .bind(row.category_id)
                    .bind(id)
                    .bind(proposal_id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO curriculum_courses \
                         (proposal_id, code, title, units, year, semester, category_id) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    )
                    .bind(proposal_id)
                    .bind(row.code.trim())
                    .bind(row.title.trim())
                    .bind(row.units)
                    .bind(row.year)
                    .bind(row.semester)
                    .bind(row.category_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }
    }

    let mapping_sections: [(DeptSection, &Option<Vec<MappingEdit>>); 5] = [
        (DeptSection::PeoMissionMappings, &payload.peo_mission_mappings),
        (DeptSection::GaPeoMappings, &payload.ga_peo_mappings),
        (DeptSection::PoPeoMappings, &payload.po_peo_mappings),
        (DeptSection::PoGaMappings, &payload.po_ga_mappings),
        (DeptSection::CoursePoMappings, &payload.course_po_mappings),
    ];
    for (section, rows) in mapping_sections {
        if let Some(rows) = rows {
            // The submitted tuple set is authoritative for its section.
            sqlx::query("DELETE FROM proposal_mappings WHERE proposal_id = ?1 AND section = ?2")
                .bind(proposal_id)
                .bind(section.as_str())
                .execute(&mut *tx)
                .await?;
            for row in rows {
                sqlx::query(
                    "INSERT INTO proposal_mappings \
                     (proposal_id, section, source_id, target_id, level) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(proposal_id)
                .bind(section.as_str())
                .bind(row.source_id)
                .bind(row.target_id)
                .bind(row.level.as_deref())
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    let new_version = proposal.version + 1;
    sqlx::query(
        "UPDATE program_proposals \
         SET version = ?1, status = 'pending', updated_at = datetime('now') WHERE id = ?2",
    )
    .bind(new_version)
    .bind(proposal_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(new_version)
}

async fn apply_statement_rows(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    proposal_id: i64,
    rows: &[crate::models::revision::StatementEdit],
) -> Result<(), AppError> {
    let kept: Vec<i64> = rows.iter().filter_map(|r| r.id).collect();
    delete_missing(tx, table, proposal_id, &kept).await?;

    for (position, row) in rows.iter().enumerate() {
        match row.id {
            Some(id) => {
                let sql = format!(
                    "UPDATE {table} SET statement = ?1, position = ?2 \
                     WHERE id = ?3 AND proposal_id = ?4"
                );
                sqlx::query(&sql)
                    .bind(row.statement.trim())
                    .bind(position as i64)
                    .bind(id)
                    .bind(proposal_id)
                    .execute(&mut **tx)
                    .await?;
            }
            None => {
                let sql = format!(
                    "INSERT INTO {table} (proposal_id, statement, position) VALUES (?1, ?2, ?3)"
                );
                sqlx::query(&sql)
                    .bind(proposal_id)
                    .bind(row.statement.trim())
                    .bind(position as i64)
                    .execute(&mut **tx)
                    .await?;
            }
        }
    }
    Ok(())
}

/// Delete rows of a proposal-owned table whose ids were not resubmitted.
/// `kept` ids come from validated payload rows, so interpolation is over
/// integers only.
async fn delete_missing(
    tx: &mut Transaction<'_, Sqlite>,
    table: &str,
    proposal_id: i64,
    kept: &[i64],
) -> Result<(), AppError> {
    let sql = if kept.is_empty() {
        format!("DELETE FROM {table} WHERE proposal_id = ?1")
    } else {
        let ids = kept
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("DELETE FROM {table} WHERE proposal_id = ?1 AND id NOT IN ({ids})")
    };
    sqlx::query(&sql).bind(proposal_id).execute(&mut **tx).await?;
    Ok(())
}

/// Create a pending proposal for a program. Used by seeding and tests;
/// proposal intake itself is owned by the enrollment side of the system.
pub async fn create(pool: &SqlitePool, program_id: i64) -> Result<i64, AppError> {
    let result = sqlx::query("INSERT INTO program_proposals (program_id) VALUES (?1)")
        .bind(program_id)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn add_peo(pool: &SqlitePool, proposal_id: i64, statement: &str, position: i64) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO proposal_peos (proposal_id, statement, position) VALUES (?1, ?2, ?3)",
    )
    .bind(proposal_id)
    .bind(statement)
    .bind(position)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn add_po(pool: &SqlitePool, proposal_id: i64, statement: &str, position: i64) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO proposal_pos (proposal_id, statement, position) VALUES (?1, ?2, ?3)",
    )
    .bind(proposal_id)
    .bind(statement)
    .bind(position)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn add_course(
    pool: &SqlitePool,
    proposal_id: i64,
    code: &str,
    title: &str,
    units: f64,
    year: i64,
    semester: i64,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO curriculum_courses (proposal_id, code, title, units, year, semester) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(proposal_id)
    .bind(code)
    .bind(title)
    .bind(units)
    .bind(year)
    .bind(semester)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

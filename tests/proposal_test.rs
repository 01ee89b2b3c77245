//! Proposal lifecycle tests: status transitions, revision requests, and
//! applying revision submissions against a live database.

mod common;

use common::*;
use obeflow::errors::AppError;
use obeflow::models::proposal::{
    self, CourseRevisionRequest, ProposalStatus, RevisionRequest, StatusChange,
};
use obeflow::models::revision::{
    self, queries as revision_queries, DeptSection, StatementEdit, SubmitRevisionsPayload,
};

fn transition(status: ProposalStatus) -> StatusChange {
    StatusChange {
        status,
        comment: None,
        revisions: vec![],
        course_revisions: vec![],
    }
}

#[tokio::test]
async fn test_new_proposal_starts_pending_at_version_one() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    let proposal = proposal::find_by_id(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("proposal exists");
    assert_eq!(proposal.status, ProposalStatus::Pending);
    assert_eq!(proposal.version, 1);
}

#[tokio::test]
async fn test_pending_proposal_can_be_approved_then_activated() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    proposal::update_status(db.pool(), fixture.proposal_id, &transition(ProposalStatus::Approved))
        .await
        .expect("approve");
    proposal::update_status(db.pool(), fixture.proposal_id, &transition(ProposalStatus::Active))
        .await
        .expect("activate");

    let proposal = proposal::find_by_id(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(proposal.status, ProposalStatus::Active);
}

#[tokio::test]
async fn test_illegal_transition_rejected() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    // pending -> active skips approval
    let result =
        proposal::update_status(db.pool(), fixture.proposal_id, &transition(ProposalStatus::Active))
            .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let proposal = proposal::find_by_id(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(proposal.status, ProposalStatus::Pending);
}

#[tokio::test]
async fn test_rejected_is_terminal() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    proposal::update_status(db.pool(), fixture.proposal_id, &transition(ProposalStatus::Rejected))
        .await
        .expect("reject");

    let result =
        proposal::update_status(db.pool(), fixture.proposal_id, &transition(ProposalStatus::Approved))
            .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_revision_request_without_items_rejected() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    let result =
        proposal::update_status(db.pool(), fixture.proposal_id, &transition(ProposalStatus::Revision))
            .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_revision_request_records_items_at_current_version() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    let change = StatusChange {
        status: ProposalStatus::Revision,
        comment: Some("see items".to_string()),
        revisions: vec![
            RevisionRequest {
                section: DeptSection::Pos,
                details: "Split the second outcome".to_string(),
            },
            RevisionRequest {
                section: DeptSection::Peos,
                details: "Reword the first objective".to_string(),
            },
        ],
        course_revisions: vec![],
    };
    proposal::update_status(db.pool(), fixture.proposal_id, &change)
        .await
        .expect("request revision");

    let items = revision_queries::find_for_proposal(db.pool(), fixture.proposal_id)
        .await
        .expect("items");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.version == 1));

    let groups = revision::group_department_revisions(items);
    assert_eq!(groups.len(), 1);
    // peos precedes pos in the declared section order
    assert_eq!(groups[0].sections[0].section, DeptSection::Peos);
    assert_eq!(groups[0].sections[1].section, DeptSection::Pos);
}

#[tokio::test]
async fn test_failed_revision_request_leaves_status_untouched() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    // One valid department item plus a course item against a course that
    // does not exist. Nothing may be written, including the valid item.
    let change = StatusChange {
        status: ProposalStatus::Revision,
        comment: None,
        revisions: vec![RevisionRequest {
            section: DeptSection::Peos,
            details: "Reword the first objective".to_string(),
        }],
        course_revisions: vec![CourseRevisionRequest {
            curriculum_course_id: 999_999,
            section: obeflow::models::revision::CommitteeSection::Abcd,
            details: "Targets a course that was never part of this proposal".to_string(),
        }],
    };
    let result = proposal::update_status(db.pool(), fixture.proposal_id, &change).await;
    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains_key("course_revisions[0].curriculum_course_id"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let proposal = proposal::find_by_id(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(proposal.status, ProposalStatus::Pending);

    let items = revision_queries::find_for_proposal(db.pool(), fixture.proposal_id)
        .await
        .expect("items");
    assert!(items.is_empty());
    let course_items =
        revision_queries::find_course_revisions_for_proposal(db.pool(), fixture.proposal_id)
            .await
            .expect("course items");
    assert!(course_items.is_empty());
}

#[tokio::test]
async fn test_submission_rejected_unless_under_revision() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    let payload = SubmitRevisionsPayload {
        peos: Some(vec![StatementEdit {
            id: Some(fixture.peo_ids[0]),
            statement: "Changed".to_string(),
        }]),
        ..Default::default()
    };
    let result = proposal::apply_submission(db.pool(), fixture.proposal_id, &payload).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_empty_submission_rejected() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;
    request_revision(db.pool(), fixture.proposal_id).await;

    let result = proposal::apply_submission(
        db.pool(),
        fixture.proposal_id,
        &SubmitRevisionsPayload::default(),
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    // No version bump happened.
    let proposal = proposal::find_by_id(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(proposal.version, 1);
}

#[tokio::test]
async fn test_submission_applies_updates_inserts_and_deletes() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;
    request_revision(db.pool(), fixture.proposal_id).await;

    // Update the first PEO, drop the second, add a new one.
    let payload = SubmitRevisionsPayload {
        peos: Some(vec![
            StatementEdit {
                id: Some(fixture.peo_ids[0]),
                statement: "Practice competently and ethically".to_string(),
            },
            StatementEdit {
                id: None,
                statement: "Lead multidisciplinary teams".to_string(),
            },
        ]),
        ..Default::default()
    };
    let new_version = proposal::apply_submission(db.pool(), fixture.proposal_id, &payload)
        .await
        .expect("apply");
    assert_eq!(new_version, 2);

    let response = proposal::find_response(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(response.status, ProposalStatus::Pending);
    assert_eq!(response.version, 2);
    assert_eq!(response.peos.len(), 2);
    assert_eq!(response.peos[0].id, fixture.peo_ids[0]);
    assert_eq!(response.peos[0].statement, "Practice competently and ethically");
    assert_eq!(response.peos[1].statement, "Lead multidisciplinary teams");
    // The dropped PEO is gone.
    assert!(!response.peos.iter().any(|p| p.id == fixture.peo_ids[1]));
    // Untouched sections kept their rows.
    assert_eq!(response.pos.len(), 2);
}

#[tokio::test]
async fn test_submission_with_unknown_id_is_a_validation_error() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;
    request_revision(db.pool(), fixture.proposal_id).await;

    let payload = SubmitRevisionsPayload {
        peos: Some(vec![StatementEdit {
            id: Some(999_999),
            statement: "Phantom row".to_string(),
        }]),
        ..Default::default()
    };
    let result = proposal::apply_submission(db.pool(), fixture.proposal_id, &payload).await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.contains_key("peos[0].id"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mapping_submission_replaces_section_tuples() {
    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;
    request_revision(db.pool(), fixture.proposal_id).await;

    let payload = SubmitRevisionsPayload {
        po_peo_mappings: Some(vec![obeflow::models::revision::MappingEdit {
            id: None,
            source_id: fixture.po_ids[0],
            target_id: fixture.peo_ids[0],
            level: None,
        }]),
        ..Default::default()
    };
    proposal::apply_submission(db.pool(), fixture.proposal_id, &payload)
        .await
        .expect("apply");

    let response = proposal::find_response(db.pool(), fixture.proposal_id)
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(response.po_peo_mappings.len(), 1);
    assert_eq!(response.po_peo_mappings[0].source_id, fixture.po_ids[0]);
    assert_eq!(response.po_peo_mappings[0].target_id, fixture.peo_ids[0]);
}

#[tokio::test]
async fn test_course_revision_items_group_by_course() {
    use obeflow::models::revision::CommitteeSection;

    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    let second_course =
        proposal::add_course(db.pool(), fixture.proposal_id, "CPE102", "Programming 1", 3.0, 1, 2)
            .await
            .expect("add course");

    for (course_id, section, details) in [
        (second_course, CommitteeSection::Abcd, "Add audience and degree"),
        (fixture.course_id, CommitteeSection::CourseOutcomes, "Tighten CO2"),
        (fixture.course_id, CommitteeSection::Cpa, "Classify CO1 as cognitive"),
    ] {
        revision_queries::append_course_revision_item(
            db.pool(),
            fixture.proposal_id,
            course_id,
            section,
            details,
            1,
        )
        .await
        .expect("append");
    }

    let items =
        revision_queries::find_course_revisions_for_proposal(db.pool(), fixture.proposal_id)
            .await
            .expect("items");
    let groups = revision::group_course_revisions(items);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].courses.len(), 2);
    assert_eq!(groups[0].courses[0].curriculum_course_id, fixture.course_id);
    assert_eq!(groups[0].courses[0].revisions.len(), 2);
    assert_eq!(groups[0].courses[1].curriculum_course_id, second_course);
    assert_eq!(groups[0].courses[1].code, "CPE102");
}

#[tokio::test]
async fn test_list_scoped_by_role() {
    use obeflow::models::role::Role;

    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;

    // A second faculty/department/program with its own proposal.
    let (other, _) = seed_other_department(db.pool()).await;

    let all = proposal::list_for_role(db.pool(), Role::Admin, None, None)
        .await
        .expect("admin list");
    assert_eq!(all.len(), 2);

    let dean = proposal::list_for_role(db.pool(), Role::Dean, Some(fixture.org.faculty_id), None)
        .await
        .expect("dean list");
    assert_eq!(dean.len(), 1);
    assert_eq!(dean[0].department_id, fixture.org.department_id);

    let dept = proposal::list_for_role(
        db.pool(),
        Role::Department,
        None,
        Some(other.department_id),
    )
    .await
    .expect("department list");
    assert_eq!(dept.len(), 1);
    assert_eq!(dept[0].department_id, other.department_id);
}

#[tokio::test]
async fn test_proposal_scope_confines_deans_to_their_faculty() {
    use obeflow::models::role::Role;

    let db = setup_test_db().await;
    let fixture = seed_proposal(db.pool()).await;
    let (_, other_proposal_id) = seed_other_department(db.pool()).await;

    // A dean reaches proposals in their own faculty.
    proposal::require_scope(
        db.pool(),
        fixture.proposal_id,
        Role::Dean,
        Some(fixture.org.faculty_id),
        None,
    )
    .await
    .expect("own faculty");

    // The same dean is refused a proposal from another faculty.
    let result = proposal::require_scope(
        db.pool(),
        other_proposal_id,
        Role::Dean,
        Some(fixture.org.faculty_id),
        None,
    )
    .await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    // Department users are confined to their own department.
    let result = proposal::require_scope(
        db.pool(),
        other_proposal_id,
        Role::Department,
        None,
        Some(fixture.org.department_id),
    )
    .await;
    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    // Admins are not scoped; a missing proposal is a plain not-found.
    proposal::require_scope(db.pool(), other_proposal_id, Role::Admin, None, None)
        .await
        .expect("admin");
    let result = proposal::require_scope(db.pool(), 999_999, Role::Admin, None, None).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

async fn seed_other_department(pool: &sqlx::SqlitePool) -> (OrgFixture, i64) {
    let faculty_id = sqlx::query("INSERT INTO faculties (name, abbreviation) VALUES ('Sciences', 'SCI')")
        .execute(pool)
        .await
        .expect("faculty")
        .last_insert_rowid();
    let department_id = sqlx::query(
        "INSERT INTO departments (faculty_id, name, abbreviation) VALUES (?1, 'Mathematics', 'MATH')",
    )
    .bind(faculty_id)
    .execute(pool)
    .await
    .expect("department")
    .last_insert_rowid();
    let program_id = sqlx::query(
        "INSERT INTO programs (department_id, name, description) VALUES (?1, 'BS Mathematics', '')",
    )
    .bind(department_id)
    .execute(pool)
    .await
    .expect("program")
    .last_insert_rowid();
    let proposal_id = proposal::create(pool, program_id).await.expect("proposal");

    (
        OrgFixture {
            faculty_id,
            department_id,
            program_id,
        },
        proposal_id,
    )
}

//! Shared test infrastructure: in-memory database setup and organization
//! fixtures (faculty, department, program, proposal).
#![allow(dead_code)]

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use obeflow::db::MIGRATIONS;
use obeflow::models::proposal;

pub struct TestDb {
    pool: SqlitePool,
}

impl TestDb {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Fresh in-memory database with the full schema applied. A single pooled
/// connection keeps the in-memory database alive for the test's duration.
pub async fn setup_test_db() -> TestDb {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Bad sqlite options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open test DB");

    sqlx::raw_sql(MIGRATIONS)
        .execute(&pool)
        .await
        .expect("Failed to run migrations");

    TestDb { pool }
}

/// Faculty -> department -> program chain most tests hang data off.
pub struct OrgFixture {
    pub faculty_id: i64,
    pub department_id: i64,
    pub program_id: i64,
}

pub async fn seed_org(pool: &SqlitePool) -> OrgFixture {
    let faculty_id = sqlx::query("INSERT INTO faculties (name, abbreviation) VALUES ('Engineering', 'ENG')")
        .execute(pool)
        .await
        .expect("seed faculty")
        .last_insert_rowid();

    let department_id = sqlx::query(
        "INSERT INTO departments (faculty_id, name, abbreviation) VALUES (?1, 'Computer Engineering', 'CpE')",
    )
    .bind(faculty_id)
    .execute(pool)
    .await
    .expect("seed department")
    .last_insert_rowid();

    let program_id = sqlx::query(
        "INSERT INTO programs (department_id, name, description) \
         VALUES (?1, 'BS Computer Engineering', 'Outcome-based CpE program')",
    )
    .bind(department_id)
    .execute(pool)
    .await
    .expect("seed program")
    .last_insert_rowid();

    OrgFixture {
        faculty_id,
        department_id,
        program_id,
    }
}

/// A pending proposal with two PEOs, two POs, and one curriculum course.
pub struct ProposalFixture {
    pub org: OrgFixture,
    pub proposal_id: i64,
    pub peo_ids: Vec<i64>,
    pub po_ids: Vec<i64>,
    pub course_id: i64,
}

pub async fn seed_proposal(pool: &SqlitePool) -> ProposalFixture {
    let org = seed_org(pool).await;

    let proposal_id = proposal::create(pool, org.program_id).await.expect("create proposal");

    let mut peo_ids = Vec::new();
    for (i, statement) in ["Practice the profession competently", "Pursue lifelong learning"]
        .iter()
        .enumerate()
    {
        let id = proposal::add_peo(pool, proposal_id, statement, i as i64)
            .await
            .expect("add peo");
        peo_ids.push(id);
    }

    let mut po_ids = Vec::new();
    for (i, statement) in ["Apply engineering knowledge", "Communicate effectively"]
        .iter()
        .enumerate()
    {
        let id = proposal::add_po(pool, proposal_id, statement, i as i64)
            .await
            .expect("add po");
        po_ids.push(id);
    }

    let course_id = proposal::add_course(pool, proposal_id, "CPE101", "Intro to Computing", 3.0, 1, 1)
        .await
        .expect("add course");

    ProposalFixture {
        org,
        proposal_id,
        peo_ids,
        po_ids,
        course_id,
    }
}

/// Move a fixture proposal into `revision` with one recorded item, so
/// submission tests start from the state that accepts them.
pub async fn request_revision(pool: &SqlitePool, proposal_id: i64) {
    use obeflow::models::proposal::{ProposalStatus, RevisionRequest, StatusChange};
    use obeflow::models::revision::DeptSection;

    let change = StatusChange {
        status: ProposalStatus::Revision,
        comment: Some("please revise".to_string()),
        revisions: vec![RevisionRequest {
            section: DeptSection::Peos,
            details: "Reword the first objective".to_string(),
        }],
        course_revisions: vec![],
    };
    proposal::update_status(pool, proposal_id, &change)
        .await
        .expect("request revision");
}

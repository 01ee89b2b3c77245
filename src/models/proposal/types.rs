use serde::{Deserialize, Serialize};

use crate::models::revision::{CommitteeSection, DeptSection, SubmitRevisionsPayload};

/// Lifecycle states of a program proposal. Transitions are enforced in
/// `queries::update_status`; the version counter only moves when a
/// revision submission is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Active,
    Revision,
    Rejected,
    Approved,
}

impl ProposalStatus {
    pub fn parse(raw: &str) -> Option<ProposalStatus> {
        match raw {
            "pending" => Some(ProposalStatus::Pending),
            "active" => Some(ProposalStatus::Active),
            "revision" => Some(ProposalStatus::Revision),
            "rejected" => Some(ProposalStatus::Rejected),
            "approved" => Some(ProposalStatus::Approved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Active => "active",
            ProposalStatus::Revision => "revision",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Approved => "approved",
        }
    }

    /// Reviewer-driven transitions. Revision submissions move
    /// `revision -> pending` separately, through `apply_submission`.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (
                ProposalStatus::Pending,
                ProposalStatus::Approved | ProposalStatus::Rejected | ProposalStatus::Revision
            ) | (ProposalStatus::Approved, ProposalStatus::Active)
        )
    }
}

/// A proposal row as stored. The client only ever sees this as a read-only
/// projection; all transitions happen server-side.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramProposal {
    pub id: i64,
    pub program_id: i64,
    pub status: ProposalStatus,
    pub version: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

/// List view: proposal plus the program/department names the role-scoped
/// list pages show.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProposalListItem {
    pub id: i64,
    pub program_id: i64,
    pub program_name: String,
    pub department_id: i64,
    pub department_name: String,
    pub status: String,
    pub version: i64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PeoRow {
    pub id: i64,
    pub statement: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PoRow {
    pub id: i64,
    pub statement: String,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MappingRow {
    pub id: i64,
    pub source_id: i64,
    pub target_id: i64,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CurriculumCourseRow {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub units: f64,
    pub year: i64,
    pub semester: i64,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurriculumDetail {
    pub id: i64,
    pub name: String,
    pub effective_year: Option<i64>,
    pub categories: Vec<CategoryRow>,
    pub courses: Vec<CurriculumCourseRow>,
}

/// The full nested detail a `GET .../program-proposals/{id}` returns:
/// program, outcome statements, mapping tables, and the curriculum grid.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramProposalResponse {
    pub id: i64,
    pub program_id: i64,
    pub program_name: String,
    pub department_id: i64,
    pub status: ProposalStatus,
    pub version: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
    pub peos: Vec<PeoRow>,
    pub pos: Vec<PoRow>,
    pub peo_mission_mappings: Vec<MappingRow>,
    pub ga_peo_mappings: Vec<MappingRow>,
    pub po_peo_mappings: Vec<MappingRow>,
    pub po_ga_mappings: Vec<MappingRow>,
    pub course_po_mappings: Vec<MappingRow>,
    pub curriculum: Option<CurriculumDetail>,
}

/// One department-level change request a reviewer attaches to a
/// revision-status transition.
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionRequest {
    pub section: DeptSection,
    pub details: String,
}

/// One committee-level change request, targeting a curriculum course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRevisionRequest {
    pub curriculum_course_id: i64,
    pub section: CommitteeSection,
    pub details: String,
}

/// Body of a reviewer status transition. `revisions` /
/// `course_revisions` only make sense together with `status: "revision"`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: ProposalStatus,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub revisions: Vec<RevisionRequest>,
    #[serde(default)]
    pub course_revisions: Vec<CourseRevisionRequest>,
}

/// The two shapes a `PUT .../program-proposals/{id}` accepts: a reviewer
/// status transition, or a department's revision submission payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProposalUpdate {
    Status(StatusChange),
    Revisions(SubmitRevisionsPayload),
}

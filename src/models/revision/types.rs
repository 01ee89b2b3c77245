use serde::{Deserialize, Serialize};

use super::section::{CommitteeSection, DeptSection};

/// One department-level change request against a proposal section.
/// Append-only: rows are written once by a reviewer and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionItem {
    pub id: i64,
    pub section: DeptSection,
    pub details: String,
    pub created_at: String,
    pub version: i64,
}

/// One committee-level change request against a section of a specific
/// curriculum course. Course code/title are denormalized for grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRevisionItem {
    pub id: i64,
    pub curriculum_course_id: i64,
    pub course_code: String,
    pub course_title: String,
    pub section: CommitteeSection,
    pub details: String,
    pub created_at: String,
    pub version: i64,
}

/// A statement-bearing row edit (PEOs, POs). `id` present means
/// update-in-place; absent means insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub statement: String,
}

/// A named row edit (course categories).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

/// A mapping tuple edit between two existing entities, with an optional
/// contribution level (e.g. the I/E/D tags on course-to-outcome maps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub source_id: i64,
    pub target_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Program detail fields a department may revise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDetailsEdit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Curriculum detail fields a department may revise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumDetailsEdit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_year: Option<i64>,
}

/// A curriculum-course row edit: placement of one course within the
/// curriculum grid (year/semester) plus units and category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub code: String,
    pub title: String,
    pub units: f64,
    pub year: i64,
    pub semester: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// The single submission a department makes when answering a revision
/// request. Each field mirrors one `DeptSection`; sections the department
/// did not touch are omitted entirely (never serialized as null or empty,
/// which would read as a deletion).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRevisionsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramDetailsEdit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peos: Option<Vec<StatementEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peo_mission_mappings: Option<Vec<MappingEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ga_peo_mappings: Option<Vec<MappingEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Vec<StatementEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_peo_mappings: Option<Vec<MappingEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_ga_mappings: Option<Vec<MappingEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curriculum: Option<CurriculumDetailsEdit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_categories: Option<Vec<NamedEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curriculum_courses: Option<Vec<CourseEdit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_po_mappings: Option<Vec<MappingEdit>>,
}

impl SubmitRevisionsPayload {
    /// True when every section is absent. Vacuous payloads are never sent
    /// to (or accepted by) the write path.
    pub fn is_empty(&self) -> bool {
        self.program.is_none()
            && self.peos.is_none()
            && self.peo_mission_mappings.is_none()
            && self.ga_peo_mappings.is_none()
            && self.pos.is_none()
            && self.po_peo_mappings.is_none()
            && self.po_ga_mappings.is_none()
            && self.curriculum.is_none()
            && self.course_categories.is_none()
            && self.curriculum_courses.is_none()
            && self.course_po_mappings.is_none()
    }

    /// Sections present in this payload, in declared order.
    pub fn sections(&self) -> Vec<DeptSection> {
        DeptSection::ORDER
            .iter()
            .copied()
            .filter(|s| self.has_section(*s))
            .collect()
    }

    pub fn has_section(&self, section: DeptSection) -> bool {
        match section {
            DeptSection::Program => self.program.is_some(),
            DeptSection::Peos => self.peos.is_some(),
            DeptSection::PeoMissionMappings => self.peo_mission_mappings.is_some(),
            DeptSection::GaPeoMappings => self.ga_peo_mappings.is_some(),
            DeptSection::Pos => self.pos.is_some(),
            DeptSection::PoPeoMappings => self.po_peo_mappings.is_some(),
            DeptSection::PoGaMappings => self.po_ga_mappings.is_some(),
            DeptSection::Curriculum => self.curriculum.is_some(),
            DeptSection::CourseCategories => self.course_categories.is_some(),
            DeptSection::CurriculumCourses => self.curriculum_courses.is_some(),
            DeptSection::CoursePoMappings => self.course_po_mappings.is_some(),
        }
    }
}

/// Committee-level revision items grouped under the curriculum course they
/// target. Revisions are ordered by creation time ascending (id ascending
/// on ties).
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithRevisions {
    pub curriculum_course_id: i64,
    pub code: String,
    pub title: String,
    pub revisions: Vec<CourseRevisionItem>,
}

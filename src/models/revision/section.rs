use std::fmt;

use serde::{Deserialize, Serialize};

/// Department-level proposal sections, in the order they are presented.
///
/// Revision items and submission payloads are always tagged with one of
/// these; the wire tag is the snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeptSection {
    Program,
    Peos,
    PeoMissionMappings,
    GaPeoMappings,
    Pos,
    PoPeoMappings,
    PoGaMappings,
    Curriculum,
    CourseCategories,
    CurriculumCourses,
    CoursePoMappings,
}

/// Committee-level (per-course) proposal sections, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitteeSection {
    CourseOutcomes,
    Abcd,
    Cpa,
    PoMappings,
    TlaTasks,
    TlaAssessmentMethod,
}

impl DeptSection {
    /// Declared presentation order. Grouped revision output follows this
    /// sequence, never arrival order.
    pub const ORDER: [DeptSection; 11] = [
        DeptSection::Program,
        DeptSection::Peos,
        DeptSection::PeoMissionMappings,
        DeptSection::GaPeoMappings,
        DeptSection::Pos,
        DeptSection::PoPeoMappings,
        DeptSection::PoGaMappings,
        DeptSection::Curriculum,
        DeptSection::CourseCategories,
        DeptSection::CurriculumCourses,
        DeptSection::CoursePoMappings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeptSection::Program => "program",
            DeptSection::Peos => "peos",
            DeptSection::PeoMissionMappings => "peo_mission_mappings",
            DeptSection::GaPeoMappings => "ga_peo_mappings",
            DeptSection::Pos => "pos",
            DeptSection::PoPeoMappings => "po_peo_mappings",
            DeptSection::PoGaMappings => "po_ga_mappings",
            DeptSection::Curriculum => "curriculum",
            DeptSection::CourseCategories => "course_categories",
            DeptSection::CurriculumCourses => "curriculum_courses",
            DeptSection::CoursePoMappings => "course_po_mappings",
        }
    }

    /// Strict parse of a wire/database tag. Unknown tags are rejected, not
    /// coerced.
    pub fn parse(tag: &str) -> Option<DeptSection> {
        Self::ORDER.iter().copied().find(|s| s.as_str() == tag)
    }

    /// Position within the declared order, used as a grouping sort key.
    pub fn position(&self) -> usize {
        Self::ORDER.iter().position(|s| s == self).unwrap_or(usize::MAX)
    }
}

impl CommitteeSection {
    pub const ORDER: [CommitteeSection; 6] = [
        CommitteeSection::CourseOutcomes,
        CommitteeSection::Abcd,
        CommitteeSection::Cpa,
        CommitteeSection::PoMappings,
        CommitteeSection::TlaTasks,
        CommitteeSection::TlaAssessmentMethod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitteeSection::CourseOutcomes => "course_outcomes",
            CommitteeSection::Abcd => "abcd",
            CommitteeSection::Cpa => "cpa",
            CommitteeSection::PoMappings => "po_mappings",
            CommitteeSection::TlaTasks => "tla_tasks",
            CommitteeSection::TlaAssessmentMethod => "tla_assessment_method",
        }
    }

    pub fn parse(tag: &str) -> Option<CommitteeSection> {
        Self::ORDER.iter().copied().find(|s| s.as_str() == tag)
    }

    pub fn position(&self) -> usize {
        Self::ORDER.iter().position(|s| s == self).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for DeptSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CommitteeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

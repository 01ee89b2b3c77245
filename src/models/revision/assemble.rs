use std::collections::{HashMap, HashSet};

use super::section::DeptSection;
use super::types::*;

/// Identifier sets from the proposal snapshot being revised. Every id a
/// staged edit references must exist here, so the backend write never has
/// to guess what an unknown id meant.
#[derive(Debug, Clone, Default)]
pub struct ProposalSnapshot {
    pub peo_ids: HashSet<i64>,
    pub po_ids: HashSet<i64>,
    pub ga_ids: HashSet<i64>,
    pub mission_ids: HashSet<i64>,
    pub category_ids: HashSet<i64>,
    pub course_ids: HashSet<i64>,
}

/// One staged edit delta, tagged by the section it belongs to. Rows carry
/// an id when they update an existing entity and none when they insert.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEdit {
    Program(ProgramDetailsEdit),
    Peos(Vec<StatementEdit>),
    PeoMissionMappings(Vec<MappingEdit>),
    GaPeoMappings(Vec<MappingEdit>),
    Pos(Vec<StatementEdit>),
    PoPeoMappings(Vec<MappingEdit>),
    PoGaMappings(Vec<MappingEdit>),
    Curriculum(CurriculumDetailsEdit),
    CourseCategories(Vec<NamedEdit>),
    CurriculumCourses(Vec<CourseEdit>),
    CoursePoMappings(Vec<MappingEdit>),
}

impl SectionEdit {
    pub fn section(&self) -> DeptSection {
        match self {
            SectionEdit::Program(_) => DeptSection::Program,
            SectionEdit::Peos(_) => DeptSection::Peos,
            SectionEdit::PeoMissionMappings(_) => DeptSection::PeoMissionMappings,
            SectionEdit::GaPeoMappings(_) => DeptSection::GaPeoMappings,
            SectionEdit::Pos(_) => DeptSection::Pos,
            SectionEdit::PoPeoMappings(_) => DeptSection::PoPeoMappings,
            SectionEdit::PoGaMappings(_) => DeptSection::PoGaMappings,
            SectionEdit::Curriculum(_) => DeptSection::Curriculum,
            SectionEdit::CourseCategories(_) => DeptSection::CourseCategories,
            SectionEdit::CurriculumCourses(_) => DeptSection::CurriculumCourses,
            SectionEdit::CoursePoMappings(_) => DeptSection::CoursePoMappings,
        }
    }
}

/// Field-keyed validation errors, keyed `section[row].field` (or just
/// `section.field` for detail sections). A failed field never discards the
/// other staged sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(pub HashMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, key: String, message: &str) {
        self.0.entry(key).or_default().push(message.to_string());
    }
}

/// Collects per-section edit deltas from independent edit forms and turns
/// them into a single `SubmitRevisionsPayload`. Staging is in-memory only;
/// nothing here touches the network or the database.
#[derive(Debug, Default)]
pub struct PayloadAssembler {
    staged: Vec<SectionEdit>,
}

impl PayloadAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage (or restage) one section's delta. A section holds at most one
    /// staged delta; staging again replaces the previous one.
    pub fn stage(&mut self, edit: SectionEdit) {
        let section = edit.section();
        self.staged.retain(|e| e.section() != section);
        self.staged.push(edit);
    }

    /// Drop a staged section without touching the others.
    pub fn unstage(&mut self, section: DeptSection) {
        self.staged.retain(|e| e.section() != section);
    }

    pub fn staged_sections(&self) -> Vec<DeptSection> {
        self.staged.iter().map(|e| e.section()).collect()
    }

    /// Local validation: required text fields must be non-empty, and every
    /// referenced identifier must exist in the snapshot. Runs over all
    /// staged sections so the caller gets the full error map at once.
    pub fn validate(&self, snapshot: &ProposalSnapshot) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for edit in &self.staged {
            let tag = edit.section().as_str();
            match edit {
                SectionEdit::Program(d) => {
                    if d.name.trim().is_empty() {
                        errors.push(format!("{tag}.name"), "is required");
                    }
                }
                SectionEdit::Curriculum(d) => {
                    if d.name.trim().is_empty() {
                        errors.push(format!("{tag}.name"), "is required");
                    }
                }
                SectionEdit::Peos(rows) => {
                    if rows.is_empty() {
                        errors.push(tag.to_string(), "at least one entry is required");
                    }
                    check_statements(&mut errors, tag, rows, &snapshot.peo_ids);
                }
                SectionEdit::Pos(rows) => {
                    if rows.is_empty() {
                        errors.push(tag.to_string(), "at least one entry is required");
                    }
                    check_statements(&mut errors, tag, rows, &snapshot.po_ids);
                }
                SectionEdit::CourseCategories(rows) => {
                    for (i, row) in rows.iter().enumerate() {
                        if row.name.trim().is_empty() {
                            errors.push(format!("{tag}[{i}].name"), "is required");
                        }
                        if let Some(id) = row.id {
                            if !snapshot.category_ids.contains(&id) {
                                errors.push(format!("{tag}[{i}].id"), "unknown identifier");
                            }
                        }
                    }
                }
                SectionEdit::CurriculumCourses(rows) => {
                    for (i, row) in rows.iter().enumerate() {
                        if row.code.trim().is_empty() {
                            errors.push(format!("{tag}[{i}].code"), "is required");
                        }
                        if row.title.trim().is_empty() {
                            errors.push(format!("{tag}[{i}].title"), "is required");
                        }
                        if let Some(id) = row.id {
                            if !snapshot.course_ids.contains(&id) {
                                errors.push(format!("{tag}[{i}].id"), "unknown identifier");
                            }
                        }
                        if let Some(cat) = row.category_id {
                            if !snapshot.category_ids.contains(&cat) {
                                errors.push(format!("{tag}[{i}].category_id"), "unknown identifier");
                            }
                        }
                    }
                }
                SectionEdit::PeoMissionMappings(rows) => {
                    check_mappings(&mut errors, tag, rows, &snapshot.peo_ids, &snapshot.mission_ids);
                }
                SectionEdit::GaPeoMappings(rows) => {
                    check_mappings(&mut errors, tag, rows, &snapshot.ga_ids, &snapshot.peo_ids);
                }
                SectionEdit::PoPeoMappings(rows) => {
                    check_mappings(&mut errors, tag, rows, &snapshot.po_ids, &snapshot.peo_ids);
                }
                SectionEdit::PoGaMappings(rows) => {
                    check_mappings(&mut errors, tag, rows, &snapshot.po_ids, &snapshot.ga_ids);
                }
                SectionEdit::CoursePoMappings(rows) => {
                    check_mappings(&mut errors, tag, rows, &snapshot.course_ids, &snapshot.po_ids);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Bundle the staged deltas into one submission payload. A section is
    /// present iff it was staged; with nothing staged there is no payload
    /// at all, so a no-edit "submit" never produces a write.
    pub fn assemble(self) -> Option<SubmitRevisionsPayload> {
        if self.staged.is_empty() {
            return None;
        }

        let mut payload = SubmitRevisionsPayload::default();
        for edit in self.staged {
            match edit {
                SectionEdit::Program(d) => payload.program = Some(d),
                SectionEdit::Peos(rows) => payload.peos = Some(rows),
                SectionEdit::PeoMissionMappings(rows) => payload.peo_mission_mappings = Some(rows),
                SectionEdit::GaPeoMappings(rows) => payload.ga_peo_mappings = Some(rows),
                SectionEdit::Pos(rows) => payload.pos = Some(rows),
                SectionEdit::PoPeoMappings(rows) => payload.po_peo_mappings = Some(rows),
                SectionEdit::PoGaMappings(rows) => payload.po_ga_mappings = Some(rows),
                SectionEdit::Curriculum(d) => payload.curriculum = Some(d),
                SectionEdit::CourseCategories(rows) => payload.course_categories = Some(rows),
                SectionEdit::CurriculumCourses(rows) => payload.curriculum_courses = Some(rows),
                SectionEdit::CoursePoMappings(rows) => payload.course_po_mappings = Some(rows),
            }
        }
        Some(payload)
    }
}

fn check_statements(
    errors: &mut ValidationErrors,
    tag: &str,
    rows: &[StatementEdit],
    known_ids: &HashSet<i64>,
) {
    for (i, row) in rows.iter().enumerate() {
        if row.statement.trim().is_empty() {
            errors.push(format!("{tag}[{i}].statement"), "is required");
        }
        if let Some(id) = row.id {
            if !known_ids.contains(&id) {
                errors.push(format!("{tag}[{i}].id"), "unknown identifier");
            }
        }
    }
}

fn check_mappings(
    errors: &mut ValidationErrors,
    tag: &str,
    rows: &[MappingEdit],
    source_ids: &HashSet<i64>,
    target_ids: &HashSet<i64>,
) {
    for (i, row) in rows.iter().enumerate() {
        if !source_ids.contains(&row.source_id) {
            errors.push(format!("{tag}[{i}].source_id"), "unknown identifier");
        }
        if !target_ids.contains(&row.target_id) {
            errors.push(format!("{tag}[{i}].target_id"), "unknown identifier");
        }
    }
}

/// Validate a fully-formed payload against a snapshot by staging each
/// present section. Used on the write path so a deserialized payload gets
/// the same checks as locally staged edits.
pub fn validate_payload(
    payload: &SubmitRevisionsPayload,
    snapshot: &ProposalSnapshot,
) -> Result<(), ValidationErrors> {
    let mut assembler = PayloadAssembler::new();
    if let Some(d) = &payload.program {
        assembler.stage(SectionEdit::Program(d.clone()));
    }
    if let Some(rows) = &payload.peos {
        assembler.stage(SectionEdit::Peos(rows.clone()));
    }
    if let Some(rows) = &payload.peo_mission_mappings {
        assembler.stage(SectionEdit::PeoMissionMappings(rows.clone()));
    }
    if let Some(rows) = &payload.ga_peo_mappings {
        assembler.stage(SectionEdit::GaPeoMappings(rows.clone()));
    }
    if let Some(rows) = &payload.pos {
        assembler.stage(SectionEdit::Pos(rows.clone()));
    }
    if let Some(rows) = &payload.po_peo_mappings {
        assembler.stage(SectionEdit::PoPeoMappings(rows.clone()));
    }
    if let Some(rows) = &payload.po_ga_mappings {
        assembler.stage(SectionEdit::PoGaMappings(rows.clone()));
    }
    if let Some(d) = &payload.curriculum {
        assembler.stage(SectionEdit::Curriculum(d.clone()));
    }
    if let Some(rows) = &payload.course_categories {
        assembler.stage(SectionEdit::CourseCategories(rows.clone()));
    }
    if let Some(rows) = &payload.curriculum_courses {
        assembler.stage(SectionEdit::CurriculumCourses(rows.clone()));
    }
    if let Some(rows) = &payload.course_po_mappings {
        assembler.stage(SectionEdit::CoursePoMappings(rows.clone()));
    }
    assembler.validate(snapshot)
}

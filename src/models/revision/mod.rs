//! The proposal revision workflow: section tags, append-only revision
//! items, per-section edit drafts, payload assembly/validation, and
//! grouping of revision history for display.

pub mod assemble;
pub mod draft;
pub mod history;
pub mod queries;
pub mod section;
pub mod types;

pub use assemble::{PayloadAssembler, ProposalSnapshot, SectionEdit, ValidationErrors};
pub use draft::{DraftError, SectionDraft};
pub use history::{
    group_course_revisions, group_department_revisions, CourseVersionRevisions, SectionRevisions,
    VersionRevisions,
};
pub use section::{CommitteeSection, DeptSection};
pub use types::*;

use super::assemble::SectionEdit;
use super::section::DeptSection;
use super::types::{CourseEdit, NamedEdit, StatementEdit};

/// Why a draft operation was refused. Refusals leave the draft untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Index outside the current row range.
    OutOfRange(usize),
    /// Removing would drop the section below its required minimum
    /// (programs keep at least one PEO and one PO).
    MinimumRows(usize),
}

/// A locally mutable copy of one section's rows. Rows loaded from a
/// proposal snapshot keep their ids; rows added here have none, which is
/// how the write path tells update-in-place from insert. The draft never
/// talks to the database; the updated collection is handed upward as a
/// `SectionEdit` once the caller is ready to stage it.
#[derive(Debug, Clone)]
pub struct SectionDraft<T> {
    section: DeptSection,
    rows: Vec<T>,
    min_rows: usize,
    dirty: bool,
}

impl<T: Clone + Default> SectionDraft<T> {
    pub fn new(section: DeptSection, rows: Vec<T>) -> Self {
        let min_rows = match section {
            DeptSection::Peos | DeptSection::Pos => 1,
            _ => 0,
        };
        SectionDraft {
            section,
            rows,
            min_rows,
            dirty: false,
        }
    }

    pub fn section(&self) -> DeptSection {
        self.section
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True once any add/update/remove has happened since load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Append a new row with default (empty) fields. Never touches
    /// existing rows.
    pub fn add(&mut self) {
        self.rows.push(T::default());
        self.dirty = true;
    }

    /// Replace exactly one row in place. Order is preserved.
    pub fn update(&mut self, index: usize, row: T) -> Result<(), DraftError> {
        let slot = self
            .rows
            .get_mut(index)
            .ok_or(DraftError::OutOfRange(index))?;
        *slot = row;
        self.dirty = true;
        Ok(())
    }

    /// Remove one row by position. Refused when the section is already at
    /// its minimum, mirroring the backend rule that a program keeps at
    /// least one PEO and one PO.
    pub fn remove(&mut self, index: usize) -> Result<T, DraftError> {
        if index >= self.rows.len() {
            return Err(DraftError::OutOfRange(index));
        }
        if self.rows.len() <= self.min_rows {
            return Err(DraftError::MinimumRows(self.min_rows));
        }
        self.dirty = true;
        Ok(self.rows.remove(index))
    }
}

impl SectionDraft<StatementEdit> {
    /// Report the collection upward iff it was touched; an untouched draft
    /// contributes nothing to the submission payload. Statement rows only
    /// belong to the two outcome sections, so a draft tagged with any
    /// other section reports nothing rather than masquerading as one.
    pub fn take_edit(&self) -> Option<SectionEdit> {
        if !self.dirty {
            return None;
        }
        match self.section {
            DeptSection::Peos => Some(SectionEdit::Peos(self.rows.clone())),
            DeptSection::Pos => Some(SectionEdit::Pos(self.rows.clone())),
            _ => None,
        }
    }
}

impl SectionDraft<NamedEdit> {
    pub fn take_edit(&self) -> Option<SectionEdit> {
        self.dirty
            .then(|| SectionEdit::CourseCategories(self.rows.clone()))
    }
}

impl SectionDraft<CourseEdit> {
    pub fn take_edit(&self) -> Option<SectionEdit> {
        self.dirty
            .then(|| SectionEdit::CurriculumCourses(self.rows.clone()))
    }
}

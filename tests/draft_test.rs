//! Section edit-state tests: add/update/remove semantics and the
//! at-least-one guard on PEO/PO collections.

use obeflow::models::revision::{
    DeptSection, DraftError, SectionDraft, SectionEdit, StatementEdit,
};

fn peo(statement: &str) -> StatementEdit {
    StatementEdit {
        id: None,
        statement: statement.to_string(),
    }
}

#[test]
fn test_add_appends_empty_row_without_touching_existing() {
    let mut draft = SectionDraft::new(DeptSection::Peos, vec![peo("A")]);
    draft.add();

    assert_eq!(draft.len(), 2);
    assert_eq!(draft.rows()[0].statement, "A");
    assert_eq!(draft.rows()[1].statement, "");
    assert!(draft.rows()[1].id.is_none());
}

#[test]
fn test_update_replaces_exactly_one_row_in_place() {
    let mut draft = SectionDraft::new(DeptSection::Pos, vec![peo("A"), peo("B")]);
    draft.update(1, peo("B revised")).expect("update");

    assert_eq!(draft.rows()[0].statement, "A");
    assert_eq!(draft.rows()[1].statement, "B revised");
    assert_eq!(draft.len(), 2);
}

#[test]
fn test_update_out_of_range_is_rejected() {
    let mut draft = SectionDraft::new(DeptSection::Peos, vec![peo("A")]);
    assert_eq!(draft.update(5, peo("X")), Err(DraftError::OutOfRange(5)));
    assert!(!draft.is_dirty());
}

#[test]
fn test_remove_refuses_to_empty_a_peo_section() {
    let mut draft = SectionDraft::new(DeptSection::Peos, vec![peo("Only one")]);
    assert_eq!(draft.remove(0), Err(DraftError::MinimumRows(1)));
    assert_eq!(draft.len(), 1);
    assert_eq!(draft.rows()[0].statement, "Only one");
}

#[test]
fn test_add_then_remove_scenario() {
    // Start with one PEO, add an empty row, remove the original, then the
    // guard stops the final removal.
    let mut draft = SectionDraft::new(DeptSection::Peos, vec![peo("A")]);

    draft.add();
    assert_eq!(draft.len(), 2);
    assert_eq!(draft.rows()[0].statement, "A");
    assert_eq!(draft.rows()[1].statement, "");

    let removed = draft.remove(0).expect("two rows, removal allowed");
    assert_eq!(removed.statement, "A");
    assert_eq!(draft.len(), 1);
    assert_eq!(draft.rows()[0].statement, "");

    assert_eq!(draft.remove(0), Err(DraftError::MinimumRows(1)));
    assert_eq!(draft.len(), 1);
}

#[test]
fn test_non_outcome_sections_may_empty_out() {
    use obeflow::models::revision::NamedEdit;

    let mut draft = SectionDraft::new(
        DeptSection::CourseCategories,
        vec![NamedEdit {
            id: Some(1),
            name: "General Education".to_string(),
        }],
    );
    assert!(draft.remove(0).is_ok());
    assert!(draft.is_empty());
}

#[test]
fn test_untouched_draft_reports_no_edit() {
    let draft = SectionDraft::new(DeptSection::Peos, vec![peo("A")]);
    assert!(!draft.is_dirty());
    assert!(draft.take_edit().is_none());
}

#[test]
fn test_touched_draft_reports_its_section_collection() {
    let mut draft = SectionDraft::new(DeptSection::Pos, vec![peo("A")]);
    draft.update(0, peo("A revised")).expect("update");

    match draft.take_edit() {
        Some(SectionEdit::Pos(rows)) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].statement, "A revised");
        }
        other => panic!("expected a pos edit, got {other:?}"),
    }
}

#[test]
fn test_statement_draft_only_reports_outcome_sections() {
    // Statement rows belong to PEOs and POs; a draft tagged with any
    // other section must not surface them as an outcome edit.
    let mut draft = SectionDraft::new(DeptSection::Curriculum, vec![peo("A")]);
    draft.update(0, peo("B")).expect("update");

    assert!(draft.is_dirty());
    assert!(draft.take_edit().is_none());
}

#[test]
fn test_failed_remove_does_not_mark_dirty() {
    let mut draft = SectionDraft::new(DeptSection::Peos, vec![peo("A")]);
    let _ = draft.remove(0);
    assert!(!draft.is_dirty());
    assert!(draft.take_edit().is_none());
}

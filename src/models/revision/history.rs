use serde::Serialize;

use super::section::DeptSection;
use super::types::{CourseRevisionItem, CourseWithRevisions, RevisionItem};

/// One section's revision items within a version group. Only emitted when
/// at least one item exists for the section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionRevisions {
    pub section: DeptSection,
    pub items: Vec<RevisionItem>,
}

/// Department-level revision items for one proposal version.
#[derive(Debug, Clone, Serialize)]
pub struct VersionRevisions {
    pub version: i64,
    pub sections: Vec<SectionRevisions>,
}

/// Committee-level revision items for one proposal version, nested by the
/// curriculum course they target.
#[derive(Debug, Clone, Serialize)]
pub struct CourseVersionRevisions {
    pub version: i64,
    pub courses: Vec<CourseWithRevisions>,
}

/// Group a flat department-level revision list for display: versions
/// descending (most recent first), sections in their declared order, items
/// by creation time ascending with id as the tie-break. Sections with no
/// items simply don't appear.
pub fn group_department_revisions(mut items: Vec<RevisionItem>) -> Vec<VersionRevisions> {
    items.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then(a.section.position().cmp(&b.section.position()))
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut groups: Vec<VersionRevisions> = Vec::new();
    for item in items {
        if groups.last().map(|g| g.version) != Some(item.version) {
            groups.push(VersionRevisions {
                version: item.version,
                sections: Vec::new(),
            });
        }
        let group = groups.last_mut().unwrap();
        match group.sections.last_mut() {
            Some(sec) if sec.section == item.section => sec.items.push(item),
            _ => group.sections.push(SectionRevisions {
                section: item.section,
                items: vec![item],
            }),
        }
    }
    groups
}

/// Group a flat committee-level revision list: versions descending, then
/// curriculum courses (id ascending), then sections in declared order.
/// Within a course the revision list keeps creation-time order so the
/// reviewer reads requests in the sequence they were raised.
pub fn group_course_revisions(mut items: Vec<CourseRevisionItem>) -> Vec<CourseVersionRevisions> {
    items.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then(a.curriculum_course_id.cmp(&b.curriculum_course_id))
            .then(a.section.position().cmp(&b.section.position()))
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut groups: Vec<CourseVersionRevisions> = Vec::new();
    for item in items {
        if groups.last().map(|g| g.version) != Some(item.version) {
            groups.push(CourseVersionRevisions {
                version: item.version,
                courses: Vec::new(),
            });
        }
        let group = groups.last_mut().unwrap();
        match group.courses.last_mut() {
            Some(c) if c.curriculum_course_id == item.curriculum_course_id => {
                c.revisions.push(item)
            }
            _ => group.courses.push(CourseWithRevisions {
                curriculum_course_id: item.curriculum_course_id,
                code: item.course_code.clone(),
                title: item.course_title.clone(),
                revisions: vec![item],
            }),
        }
    }
    groups
}

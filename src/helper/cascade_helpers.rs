//! Operation catalogue and the post-mutation hooks each operation registers.
//!
//! A hook runs inside the operation's write transaction, after the mutation and
//! before commit, so a failing hook rolls the whole operation back.

use crate::models::db_operations::{chapters_db_operations, courses_db_operations, DbError};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateCourse,
    UpdateCourseField,
    AddCourseAttachment,
    DeleteCourseAttachment,
    PublishCourse,
    UnpublishCourse,
    DeleteCourse,
    CreateChapter,
    ReorderChapters,
    UpdateChapterField,
    SetChapterVideo,
    DeleteChapter,
    PublishChapter,
    UnpublishChapter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostMutationHook {
    /// Un-publishes the course once it no longer has a published chapter.
    ReconcileCoursePublishState,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateCourse => "createCourse",
            Operation::UpdateCourseField => "updateCourseField",
            Operation::AddCourseAttachment => "addCourseAttachment",
            Operation::DeleteCourseAttachment => "deleteCourseAttachment",
            Operation::PublishCourse => "publishCourse",
            Operation::UnpublishCourse => "unpublishCourse",
            Operation::DeleteCourse => "deleteCourse",
            Operation::CreateChapter => "createChapter",
            Operation::ReorderChapters => "reorderChapters",
            Operation::UpdateChapterField => "updateChapterField",
            Operation::SetChapterVideo => "setChapterVideo",
            Operation::DeleteChapter => "deleteChapter",
            Operation::PublishChapter => "publishChapter",
            Operation::UnpublishChapter => "unpublishChapter",
        }
    }

    pub fn hooks(self) -> &'static [PostMutationHook] {
        match self {
            Operation::DeleteChapter | Operation::UnpublishChapter => {
                &[PostMutationHook::ReconcileCoursePublishState]
            }
            _ => &[],
        }
    }
}

/// Forces `is_published = false` on the course when none of its chapters is published.
/// Returns whether the course row changed.
pub fn reconcile_course_after_chapter_change(conn: &Connection, course_id: &str) -> Result<bool, DbError> {
    if chapters_db_operations::count_published_chapters(conn, course_id)? > 0 {
        return Ok(false);
    }
    let changed = courses_db_operations::set_course_published(conn, course_id, false)?;
    if changed {
        log::info!("Course {} un-published: no published chapters remain.", course_id);
    }
    Ok(changed)
}

pub fn run_post_mutation_hooks(conn: &Connection, op: Operation, course_id: &str) -> Result<(), DbError> {
    for hook in op.hooks() {
        match hook {
            PostMutationHook::ReconcileCoursePublishState => {
                reconcile_course_after_chapter_change(conn, course_id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup::open_memory_pool;

    #[test]
    fn only_chapter_removals_register_the_reconcile_hook() {
        assert_eq!(Operation::DeleteChapter.hooks(), &[PostMutationHook::ReconcileCoursePublishState]);
        assert_eq!(Operation::UnpublishChapter.hooks(), &[PostMutationHook::ReconcileCoursePublishState]);
        for op in [Operation::PublishChapter, Operation::DeleteCourse, Operation::ReorderChapters, Operation::UnpublishCourse] {
            assert!(op.hooks().is_empty(), "{} should have no hooks", op.name());
        }
    }

    #[test]
    fn reconcile_unpublishes_course_without_published_chapters() {
        let pool = open_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let course = courses_db_operations::create_course(&conn, "owner", "Rust").unwrap();
        let chapter = chapters_db_operations::create_chapter(&conn, &course.id, "A").unwrap();
        courses_db_operations::set_course_published(&conn, &course.id, true).unwrap();

        assert!(reconcile_course_after_chapter_change(&conn, &course.id).unwrap());
        assert!(!courses_db_operations::read_course(&conn, &course.id).unwrap().unwrap().is_published);
        // Idempotent once the course is already a draft.
        assert!(!reconcile_course_after_chapter_change(&conn, &course.id).unwrap());

        chapters_db_operations::set_chapter_published(&conn, &course.id, &chapter.id, true).unwrap();
        courses_db_operations::set_course_published(&conn, &course.id, true).unwrap();
        run_post_mutation_hooks(&conn, Operation::UnpublishChapter, &course.id).unwrap();
        assert!(courses_db_operations::read_course(&conn, &course.id).unwrap().unwrap().is_published);
    }
}

use crate::helper::ActionError;
use crate::models::db_operations::{chapters_db_operations, courses_db_operations};
use crate::models::{Chapter, Course, Principal};
use rusqlite::Connection;

/// Loads the course and checks that `principal` owns it. Read only.
pub fn authorize(conn: &Connection, principal: Option<&Principal>, course_id: &str) -> Result<Course, ActionError> {
    let principal = principal.ok_or(ActionError::Unauthenticated)?;

    let course = courses_db_operations::read_course(conn, course_id)?
        .ok_or_else(|| ActionError::NotFound("Course".to_string()))?;

    if course.user_id != principal.user_id {
        log::warn!("User {} attempted to modify course {} owned by someone else.", principal.user_id, course_id);
        return Err(ActionError::NotOwner);
    }
    Ok(course)
}

/// Chapter-scoped guard: the course must be owned by `principal` and the chapter must belong to it.
pub fn authorize_chapter(
    conn: &Connection,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
) -> Result<(Course, Chapter), ActionError> {
    let course = authorize(conn, principal, course_id)?;
    let chapter = chapters_db_operations::read_chapter(conn, course_id, chapter_id)?
        .ok_or_else(|| ActionError::NotFound("Chapter".to_string()))?;
    Ok((course, chapter))
}

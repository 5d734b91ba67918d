use crate::helper::cascade_helpers::{run_post_mutation_hooks, Operation};
use crate::helper::completeness_helpers;
use crate::helper::ownership_helpers::authorize;
use crate::helper::sanitization_helpers::strip_all_html;
use crate::helper::video_helpers::{release_remote_assets, VideoHost};
use crate::helper::{get_conn, require_text, write_transaction, ActionError};
use crate::models::db_operations::{categories_db_operations, chapters_db_operations, courses_db_operations, video_assets_db_operations};
use crate::models::{Attachment, Course, CourseDetail, CoursePatch, CourseSummary, Principal};
use crate::DbPool;
use rusqlite::Connection;
use url::Url;

// --- Field rules ---

fn validate_course_patch(conn: &Connection, patch: &CoursePatch) -> Result<CoursePatch, ActionError> {
    Ok(match patch {
        CoursePatch::Title(title) => CoursePatch::Title(require_text(&strip_all_html(title), "Title")?),
        CoursePatch::Description(text) => CoursePatch::Description(require_text(&strip_all_html(text), "Description")?),
        CoursePatch::ImageUrl(url) => CoursePatch::ImageUrl(require_text(url, "Image")?),
        CoursePatch::Category(category_id) => {
            let category_id = require_text(category_id, "Category")?;
            if !categories_db_operations::category_exists(conn, &category_id)? {
                return Err(ActionError::Validation("Category does not exist".to_string()));
            }
            CoursePatch::Category(category_id)
        }
        CoursePatch::Price(price) => {
            if price.is_finite() && *price < 0.0 {
                return Err(ActionError::Validation("Price cannot be negative".to_string()));
            }
            if !completeness_helpers::is_price_set(Some(*price)) {
                return Err(ActionError::Validation("Price is required".to_string()));
            }
            CoursePatch::Price(*price)
        }
    })
}

/// Display name for an attachment: the last path segment of its URL.
pub fn attachment_name_from_url(raw: &str) -> String {
    if let Ok(url) = Url::parse(raw) {
        if let Some(segment) = url.path_segments().and_then(|segments| segments.last()) {
            return segment.to_string();
        }
    }
    raw.rsplit('/').next().unwrap_or_default().to_string()
}

// --- Operations ---

pub fn create_course(pool: &DbPool, principal: Option<&Principal>, title: &str) -> Result<String, ActionError> {
    let principal = principal.ok_or(ActionError::Unauthenticated)?;
    let title = require_text(&strip_all_html(title), "Title")?;

    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    let course = courses_db_operations::create_course(&tx, &principal.user_id, &title)?;
    run_post_mutation_hooks(&tx, Operation::CreateCourse, &course.id)?;
    tx.commit()?;

    log::info!("User {} created course {}.", principal.user_id, course.id);
    Ok(course.id)
}

pub fn update_course(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    patch: &CoursePatch,
) -> Result<String, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize(&tx, principal, course_id)?;
    let patch = validate_course_patch(&tx, patch)?;
    courses_db_operations::update_course_field(&tx, course_id, &patch)?;
    run_post_mutation_hooks(&tx, Operation::UpdateCourseField, course_id)?;
    tx.commit()?;
    Ok(course_id.to_string())
}

pub fn add_attachment(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    url: &str,
) -> Result<Attachment, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize(&tx, principal, course_id)?;
    let url = require_text(url, "Url")?;
    let attachment = courses_db_operations::create_attachment(&tx, course_id, &url, &attachment_name_from_url(&url))?;
    run_post_mutation_hooks(&tx, Operation::AddCourseAttachment, course_id)?;
    tx.commit()?;
    Ok(attachment)
}

pub fn delete_attachment(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    attachment_id: &str,
) -> Result<(), ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize(&tx, principal, course_id)?;
    if courses_db_operations::read_attachment(&tx, course_id, attachment_id)?.is_none() {
        return Err(ActionError::NotFound("Attachment".to_string()));
    }
    courses_db_operations::delete_attachment(&tx, course_id, attachment_id)?;
    run_post_mutation_hooks(&tx, Operation::DeleteCourseAttachment, course_id)?;
    tx.commit()?;
    Ok(())
}

pub fn publish_course(pool: &DbPool, principal: Option<&Principal>, course_id: &str) -> Result<Course, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    let course = authorize(&tx, principal, course_id)?;

    let chapters = chapters_db_operations::read_chapters_for_course(&tx, course_id)?;
    let missing = completeness_helpers::missing_course_requirements(&course, &chapters);
    if !missing.is_empty() {
        return Err(ActionError::IncompleteForPublish(completeness_helpers::incomplete_course_message(&missing)));
    }

    courses_db_operations::set_course_published(&tx, course_id, true)?;
    run_post_mutation_hooks(&tx, Operation::PublishCourse, course_id)?;
    let course = courses_db_operations::read_course(&tx, course_id)?
        .ok_or_else(|| ActionError::NotFound("Course".to_string()))?;
    tx.commit()?;

    log::info!("Course {} published.", course_id);
    Ok(course)
}

pub fn unpublish_course(pool: &DbPool, principal: Option<&Principal>, course_id: &str) -> Result<Course, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize(&tx, principal, course_id)?;
    courses_db_operations::set_course_published(&tx, course_id, false)?;
    run_post_mutation_hooks(&tx, Operation::UnpublishCourse, course_id)?;
    let course = courses_db_operations::read_course(&tx, course_id)?
        .ok_or_else(|| ActionError::NotFound("Course".to_string()))?;
    tx.commit()?;

    log::info!("Course {} un-published.", course_id);
    Ok(course)
}

/// Removes the course with everything under it, then releases its video assets on the host.
pub async fn delete_course(
    pool: &DbPool,
    host: &dyn VideoHost,
    principal: Option<&Principal>,
    course_id: &str,
) -> Result<(), ActionError> {
    let asset_ids = {
        let mut conn = get_conn(pool)?;
        let tx = write_transaction(&mut conn)?;
        authorize(&tx, principal, course_id)?;
        let asset_ids = video_assets_db_operations::list_asset_ids_for_course(&tx, course_id)?;
        courses_db_operations::delete_course(&tx, course_id)?;
        run_post_mutation_hooks(&tx, Operation::DeleteCourse, course_id)?;
        tx.commit()?;
        asset_ids
    };

    log::info!("Course {} deleted with {} video asset(s).", course_id, asset_ids.len());
    release_remote_assets(pool, host, &asset_ids, "course deleted").await;
    Ok(())
}

// --- Reads for the editor ---

pub fn list_own_courses(pool: &DbPool, principal: Option<&Principal>) -> Result<Vec<CourseSummary>, ActionError> {
    let principal = principal.ok_or(ActionError::Unauthenticated)?;
    let conn = get_conn(pool)?;
    Ok(courses_db_operations::read_course_summaries_by_user(&conn, &principal.user_id)?)
}

pub fn course_detail(pool: &DbPool, principal: Option<&Principal>, course_id: &str) -> Result<CourseDetail, ActionError> {
    let conn = get_conn(pool)?;
    let course = authorize(&conn, principal, course_id)?;
    let chapters = chapters_db_operations::read_chapters_for_course(&conn, course_id)?;
    let attachments = courses_db_operations::read_attachments_for_course(&conn, course_id)?;
    let progress = completeness_helpers::course_progress(&course, &chapters);
    Ok(CourseDetail { course, chapters, attachments, progress })
}

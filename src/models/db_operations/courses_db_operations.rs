use crate::models::db_operations::DbError;
use crate::models::{Attachment, Course, CoursePatch, CourseSummary};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const COURSE_COLUMNS: &str =
    "id, user_id, title, description, image_url, price, is_published, category_id, created_at, updated_at";

fn course_from_row(row: &Row) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        price: row.get(5)?,
        is_published: row.get(6)?,
        category_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn attachment_from_row(row: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        course_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

// ====================================================================
// ======================== COURSE OPERATIONS =========================
// ====================================================================

pub fn create_course(conn: &Connection, user_id: &str, title: &str) -> Result<Course, DbError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    conn.execute(
        "INSERT INTO courses (id, user_id, title, is_published, created_at, updated_at)
         VALUES (?1, ?2, ?3, 0, ?4, ?4)",
        params![id, user_id, title, now],
    )?;
    read_course(conn, &id)?.ok_or_else(|| DbError::NotFound("Course".to_string()))
}

pub fn read_course(conn: &Connection, course_id: &str) -> Result<Option<Course>, DbError> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?1", COURSE_COLUMNS);
    Ok(conn.query_row(&sql, [course_id], course_from_row).optional()?)
}

/// Writes a single already-validated field.
pub fn update_course_field(conn: &Connection, course_id: &str, patch: &CoursePatch) -> Result<(), DbError> {
    let now = Utc::now();
    let changed = match patch {
        CoursePatch::Title(title) => conn.execute(
            "UPDATE courses SET title = ?1, updated_at = ?2 WHERE id = ?3",
            params![title, now, course_id],
        )?,
        CoursePatch::Description(description) => conn.execute(
            "UPDATE courses SET description = ?1, updated_at = ?2 WHERE id = ?3",
            params![description, now, course_id],
        )?,
        CoursePatch::Category(category_id) => conn.execute(
            "UPDATE courses SET category_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![category_id, now, course_id],
        )?,
        CoursePatch::ImageUrl(image_url) => conn.execute(
            "UPDATE courses SET image_url = ?1, updated_at = ?2 WHERE id = ?3",
            params![image_url, now, course_id],
        )?,
        CoursePatch::Price(price) => conn.execute(
            "UPDATE courses SET price = ?1, updated_at = ?2 WHERE id = ?3",
            params![price, now, course_id],
        )?,
    };
    if changed == 0 {
        return Err(DbError::NotFound("Course".to_string()));
    }
    Ok(())
}

/// Returns true when the stored flag actually changed.
pub fn set_course_published(conn: &Connection, course_id: &str, is_published: bool) -> Result<bool, DbError> {
    let changed = conn.execute(
        "UPDATE courses SET is_published = ?1, updated_at = ?2 WHERE id = ?3 AND is_published != ?1",
        params![is_published, Utc::now(), course_id],
    )?;
    Ok(changed > 0)
}

/// Chapters, attachments and video asset records go with it through `ON DELETE CASCADE`.
pub fn delete_course(conn: &Connection, course_id: &str) -> Result<(), DbError> {
    let deleted = conn.execute("DELETE FROM courses WHERE id = ?1", [course_id])?;
    if deleted == 0 {
        return Err(DbError::NotFound("Course".to_string()));
    }
    Ok(())
}

pub fn read_course_summaries_by_user(conn: &Connection, user_id: &str) -> Result<Vec<CourseSummary>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, price, is_published, created_at FROM courses
         WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([user_id], |row| {
        Ok(CourseSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            price: row.get(2)?,
            is_published: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;

    let mut courses = Vec::new();
    for course in rows {
        courses.push(course?);
    }
    Ok(courses)
}

/// Published courses for the public catalog, newest first.
pub fn read_published_courses(
    conn: &Connection,
    category_id: Option<&str>,
    title_query: Option<&str>,
) -> Result<Vec<Course>, DbError> {
    let sql = format!(
        "SELECT {} FROM courses
         WHERE is_published = 1
           AND (?1 IS NULL OR category_id = ?1)
           AND (?2 IS NULL OR instr(lower(title), lower(?2)) > 0)
         ORDER BY created_at DESC, rowid DESC",
        COURSE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![category_id, title_query], course_from_row)?;

    let mut courses = Vec::new();
    for course in rows {
        courses.push(course?);
    }
    Ok(courses)
}

// ====================================================================
// ====================== ATTACHMENT OPERATIONS =======================
// ====================================================================

pub fn create_attachment(conn: &Connection, course_id: &str, url: &str, name: &str) -> Result<Attachment, DbError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO attachments (id, name, url, course_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, url, course_id, Utc::now()],
    )?;
    read_attachment(conn, course_id, &id)?.ok_or_else(|| DbError::NotFound("Attachment".to_string()))
}

/// Only finds the attachment if it belongs to the given course.
pub fn read_attachment(conn: &Connection, course_id: &str, attachment_id: &str) -> Result<Option<Attachment>, DbError> {
    Ok(conn
        .query_row(
            "SELECT id, name, url, course_id, created_at FROM attachments WHERE id = ?1 AND course_id = ?2",
            [attachment_id, course_id],
            attachment_from_row,
        )
        .optional()?)
}

pub fn delete_attachment(conn: &Connection, course_id: &str, attachment_id: &str) -> Result<(), DbError> {
    let deleted = conn.execute(
        "DELETE FROM attachments WHERE id = ?1 AND course_id = ?2",
        [attachment_id, course_id],
    )?;
    if deleted == 0 {
        return Err(DbError::NotFound("Attachment".to_string()));
    }
    Ok(())
}

pub fn read_attachments_for_course(conn: &Connection, course_id: &str) -> Result<Vec<Attachment>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, url, course_id, created_at FROM attachments
         WHERE course_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([course_id], attachment_from_row)?;

    let mut attachments = Vec::new();
    for attachment in rows {
        attachments.push(attachment?);
    }
    Ok(attachments)
}

use crate::models::db_operations::DbError;
use crate::models::{Chapter, ChapterPatch, ChapterPosition};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const CHAPTER_COLUMNS: &str =
    "id, title, description, video_url, position, is_published, is_free, course_id, created_at, updated_at";

fn chapter_from_row(row: &Row) -> rusqlite::Result<Chapter> {
    Ok(Chapter {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        video_url: row.get(3)?,
        position: row.get(4)?,
        is_published: row.get(5)?,
        is_free: row.get(6)?,
        course_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Highest existing position + 1, or 1 for a course without chapters. Gaps are not filled.
pub fn next_position(conn: &Connection, course_id: &str) -> Result<i64, DbError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(position) FROM chapters WHERE course_id = ?1",
        [course_id],
        |row| row.get(0),
    )?;
    Ok(max.map_or(1, |p| p + 1))
}

/// Appends a chapter at the end of the course. Call inside a write transaction so the
/// position read and the insert cannot interleave with another writer.
pub fn create_chapter(conn: &Connection, course_id: &str, title: &str) -> Result<Chapter, DbError> {
    let id = Uuid::new_v4().to_string();
    let position = next_position(conn, course_id)?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO chapters (id, title, position, is_published, is_free, course_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, 0, 0, ?4, ?5, ?5)",
        params![id, title, position, course_id, now],
    )?;
    read_chapter(conn, course_id, &id)?.ok_or_else(|| DbError::NotFound("Chapter".to_string()))
}

/// Only finds the chapter if it belongs to the given course.
pub fn read_chapter(conn: &Connection, course_id: &str, chapter_id: &str) -> Result<Option<Chapter>, DbError> {
    let sql = format!("SELECT {} FROM chapters WHERE id = ?1 AND course_id = ?2", CHAPTER_COLUMNS);
    Ok(conn.query_row(&sql, [chapter_id, course_id], chapter_from_row).optional()?)
}

/// All chapters of a course in display order.
pub fn read_chapters_for_course(conn: &Connection, course_id: &str) -> Result<Vec<Chapter>, DbError> {
    let sql = format!("SELECT {} FROM chapters WHERE course_id = ?1 ORDER BY position ASC", CHAPTER_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([course_id], chapter_from_row)?;

    let mut chapters = Vec::new();
    for chapter in rows {
        chapters.push(chapter?);
    }
    Ok(chapters)
}

pub fn update_chapter_field(
    conn: &Connection,
    course_id: &str,
    chapter_id: &str,
    patch: &ChapterPatch,
) -> Result<(), DbError> {
    let now = Utc::now();
    let changed = match patch {
        ChapterPatch::Title(title) => conn.execute(
            "UPDATE chapters SET title = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
            params![title, now, chapter_id, course_id],
        )?,
        ChapterPatch::Description(description) => conn.execute(
            "UPDATE chapters SET description = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
            params![description, now, chapter_id, course_id],
        )?,
        ChapterPatch::IsFree(is_free) => conn.execute(
            "UPDATE chapters SET is_free = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
            params![is_free, now, chapter_id, course_id],
        )?,
    };
    if changed == 0 {
        return Err(DbError::NotFound("Chapter".to_string()));
    }
    Ok(())
}

pub fn set_chapter_video_url(conn: &Connection, course_id: &str, chapter_id: &str, video_url: &str) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE chapters SET video_url = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
        params![video_url, Utc::now(), chapter_id, course_id],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound("Chapter".to_string()));
    }
    Ok(())
}

pub fn set_chapter_published(conn: &Connection, course_id: &str, chapter_id: &str, is_published: bool) -> Result<(), DbError> {
    let changed = conn.execute(
        "UPDATE chapters SET is_published = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
        params![is_published, Utc::now(), chapter_id, course_id],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound("Chapter".to_string()));
    }
    Ok(())
}

/// The video asset record goes with it through `ON DELETE CASCADE`.
pub fn delete_chapter(conn: &Connection, course_id: &str, chapter_id: &str) -> Result<(), DbError> {
    let deleted = conn.execute(
        "DELETE FROM chapters WHERE id = ?1 AND course_id = ?2",
        [chapter_id, course_id],
    )?;
    if deleted == 0 {
        return Err(DbError::NotFound("Chapter".to_string()));
    }
    Ok(())
}

pub fn count_published_chapters(conn: &Connection, course_id: &str) -> Result<i64, DbError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM chapters WHERE course_id = ?1 AND is_published = 1",
        [course_id],
        |row| row.get(0),
    )?)
}

/// Rewrites the given positions. Must run inside a transaction: on any error the caller
/// rolls back and no chapter moves.
///
/// Positions are first parked on distinct negative values so that swapping two chapters
/// never collides with the `UNIQUE (course_id, position)` index halfway through.
pub fn apply_chapter_positions(conn: &Connection, course_id: &str, items: &[ChapterPosition]) -> Result<(), DbError> {
    let now = Utc::now();
    let mut stmt = conn.prepare(
        "UPDATE chapters SET position = ?1, updated_at = ?2 WHERE id = ?3 AND course_id = ?4",
    )?;

    for (i, item) in items.iter().enumerate() {
        let parked = -(i as i64) - 1;
        if stmt.execute(params![parked, now, item.chapter_id, course_id])? == 0 {
            return Err(DbError::NotFound("Chapter".to_string()));
        }
    }

    for item in items {
        stmt.execute(params![item.position, now, item.chapter_id, course_id])?;
    }
    Ok(())
}

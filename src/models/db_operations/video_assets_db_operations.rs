use crate::models::db_operations::DbError;
use crate::models::VideoAssetRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

pub fn read_video_asset_for_chapter(conn: &Connection, chapter_id: &str) -> Result<Option<VideoAssetRecord>, DbError> {
    Ok(conn
        .query_row(
            "SELECT id, asset_id, playback_id, chapter_id FROM video_assets WHERE chapter_id = ?1",
            [chapter_id],
            |row| {
                Ok(VideoAssetRecord {
                    id: row.get(0)?,
                    asset_id: row.get(1)?,
                    playback_id: row.get(2)?,
                    chapter_id: row.get(3)?,
                })
            },
        )
        .optional()?)
}

/// Drops whatever record the chapter had and stores the new one. Records are never updated in place.
pub fn replace_video_asset(
    conn: &Connection,
    chapter_id: &str,
    asset_id: &str,
    playback_id: Option<&str>,
) -> Result<VideoAssetRecord, DbError> {
    conn.execute("DELETE FROM video_assets WHERE chapter_id = ?1", [chapter_id])?;
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO video_assets (id, asset_id, playback_id, chapter_id) VALUES (?1, ?2, ?3, ?4)",
        params![id, asset_id, playback_id, chapter_id],
    )?;
    Ok(VideoAssetRecord {
        id,
        asset_id: asset_id.to_string(),
        playback_id: playback_id.map(|s| s.to_string()),
        chapter_id: chapter_id.to_string(),
    })
}

/// Remote asset ids of every chapter in the course that has a video asset record.
pub fn list_asset_ids_for_course(conn: &Connection, course_id: &str) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT v.asset_id FROM video_assets v
         JOIN chapters c ON c.id = v.chapter_id
         WHERE c.course_id = ?1",
    )?;
    let rows = stmt.query_map([course_id], |row| row.get(0))?;

    let mut ids = Vec::new();
    for id in rows {
        ids.push(id?);
    }
    Ok(ids)
}

// --- Remote assets whose deletion failed after the local change committed ---

pub fn record_orphaned_asset(conn: &Connection, asset_id: &str, reason: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR REPLACE INTO orphaned_video_assets (asset_id, reason, recorded_at) VALUES (?1, ?2, ?3)",
        params![asset_id, reason, Utc::now()],
    )?;
    Ok(())
}

pub fn list_orphaned_assets(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare("SELECT asset_id FROM orphaned_video_assets ORDER BY recorded_at ASC")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut ids = Vec::new();
    for id in rows {
        ids.push(id?);
    }
    Ok(ids)
}

pub fn remove_orphaned_asset(conn: &Connection, asset_id: &str) -> Result<(), DbError> {
    conn.execute("DELETE FROM orphaned_video_assets WHERE asset_id = ?1", [asset_id])?;
    Ok(())
}

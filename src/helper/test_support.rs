use crate::helper::video_helpers::{VideoAsset, VideoHost, VideoHostError};
use crate::models::db_operations::{categories_db_operations, chapters_db_operations, courses_db_operations, video_assets_db_operations};
use crate::models::{Chapter, Course, CoursePatch};
use crate::setup::db_setup::open_memory_pool;
use crate::DbPool;
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    next_id: usize,
    created: Vec<String>,
    deleted: Vec<String>,
    fail_create: bool,
    fail_delete: bool,
}

/// Records every call instead of talking to a real host.
#[derive(Default)]
pub struct FakeVideoHost {
    state: Mutex<FakeState>,
}

impl FakeVideoHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creates(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }
}

#[async_trait]
impl VideoHost for FakeVideoHost {
    async fn create_asset(&self, _source_url: &str) -> Result<VideoAsset, VideoHostError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create {
            return Err(VideoHostError::Api { status: 503, body: "unavailable".to_string() });
        }
        state.next_id += 1;
        let asset_id = format!("asset_{}", state.next_id);
        state.created.push(asset_id.clone());
        Ok(VideoAsset { playback_id: Some(format!("play_{}", state.next_id)), asset_id })
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), VideoHostError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(VideoHostError::Api { status: 500, body: "boom".to_string() });
        }
        state.deleted.push(asset_id.to_string());
        Ok(())
    }
}

pub fn pool() -> DbPool {
    open_memory_pool().unwrap()
}

pub fn course_row(pool: &DbPool, course_id: &str) -> Course {
    let conn = pool.get().unwrap();
    courses_db_operations::read_course(&conn, course_id).unwrap().unwrap()
}

pub fn chapter_row(pool: &DbPool, course_id: &str, chapter_id: &str) -> Chapter {
    let conn = pool.get().unwrap();
    chapters_db_operations::read_chapter(&conn, course_id, chapter_id).unwrap().unwrap()
}

fn fill_course(conn: &Connection, course_id: &str) {
    let category_id = categories_db_operations::add_category(conn, "Computer Science").unwrap();
    for patch in [
        CoursePatch::Description("Systems programming".to_string()),
        CoursePatch::ImageUrl("https://cdn/rust.png".to_string()),
        CoursePatch::Category(category_id),
        CoursePatch::Price(29.0),
    ] {
        courses_db_operations::update_course_field(conn, course_id, &patch).unwrap();
    }
}

/// A chapter that satisfies every publish requirement, asset record included.
pub fn complete_chapter(conn: &Connection, course_id: &str, title: &str, asset_id: &str, published: bool) -> Chapter {
    let chapter = chapters_db_operations::create_chapter(conn, course_id, title).unwrap();
    chapters_db_operations::update_chapter_field(
        conn,
        course_id,
        &chapter.id,
        &crate::models::ChapterPatch::Description(format!("{} in depth", title)),
    )
    .unwrap();
    chapters_db_operations::set_chapter_video_url(conn, course_id, &chapter.id, &format!("https://files/{}.mp4", asset_id)).unwrap();
    video_assets_db_operations::replace_video_asset(conn, &chapter.id, asset_id, Some("play")).unwrap();
    if published {
        chapters_db_operations::set_chapter_published(conn, course_id, &chapter.id, true).unwrap();
    }
    chapters_db_operations::read_chapter(conn, course_id, &chapter.id).unwrap().unwrap()
}

/// Owned by `owner`: every course field filled and `published_chapters` published,
/// complete chapters backed by assets `seed_asset_1..`. The course itself stays a draft.
pub fn seed_complete_course(pool: &DbPool, owner: &str, published_chapters: usize) -> (Course, Vec<Chapter>) {
    let conn = pool.get().unwrap();
    let course = courses_db_operations::create_course(&conn, owner, "Rust").unwrap();
    fill_course(&conn, &course.id);
    let chapters = (1..=published_chapters)
        .map(|i| complete_chapter(&conn, &course.id, &format!("Chapter {}", i), &format!("seed_asset_{}", i), true))
        .collect();
    let course = courses_db_operations::read_course(&conn, &course.id).unwrap().unwrap();
    (course, chapters)
}

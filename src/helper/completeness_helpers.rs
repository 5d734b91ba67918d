//! Minimum-content rules a course or chapter must meet before it may be published.
//! Pure functions over already-loaded rows.

use crate::models::{Chapter, CompletionProgress, Course};

pub const COURSE_REQUIREMENTS: usize = 6;
pub const CHAPTER_REQUIREMENTS: usize = 4;

fn is_present(value: Option<&str>) -> bool {
    value.map_or(false, |s| !s.trim().is_empty())
}

/// A zero price counts as no price at all.
pub fn is_price_set(price: Option<f64>) -> bool {
    price.map_or(false, |p| p.is_finite() && p > 0.0)
}

/// Names of the unmet course requirements, in the order the editor lists them.
pub fn missing_course_requirements(course: &Course, chapters: &[Chapter]) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if course.title.trim().is_empty() {
        missing.push("title");
    }
    if !is_present(course.description.as_deref()) {
        missing.push("description");
    }
    if !is_present(course.image_url.as_deref()) {
        missing.push("image");
    }
    if !is_present(course.category_id.as_deref()) {
        missing.push("category");
    }
    if !is_price_set(course.price) {
        missing.push("price");
    }
    if !chapters.iter().any(|c| c.is_published) {
        missing.push("a published chapter");
    }
    missing
}

pub fn missing_chapter_requirements(chapter: &Chapter, has_video_asset: bool) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if chapter.title.trim().is_empty() {
        missing.push("title");
    }
    if !is_present(chapter.description.as_deref()) {
        missing.push("description");
    }
    if !is_present(chapter.video_url.as_deref()) {
        missing.push("video");
    }
    if !has_video_asset {
        missing.push("processed video asset");
    }
    missing
}

pub fn can_publish_course(course: &Course, chapters: &[Chapter]) -> bool {
    missing_course_requirements(course, chapters).is_empty()
}

pub fn can_publish_chapter(chapter: &Chapter, has_video_asset: bool) -> bool {
    missing_chapter_requirements(chapter, has_video_asset).is_empty()
}

pub fn course_progress(course: &Course, chapters: &[Chapter]) -> CompletionProgress {
    CompletionProgress {
        completed: COURSE_REQUIREMENTS - missing_course_requirements(course, chapters).len(),
        total: COURSE_REQUIREMENTS,
    }
}

pub fn chapter_progress(chapter: &Chapter, has_video_asset: bool) -> CompletionProgress {
    CompletionProgress {
        completed: CHAPTER_REQUIREMENTS - missing_chapter_requirements(chapter, has_video_asset).len(),
        total: CHAPTER_REQUIREMENTS,
    }
}

pub fn incomplete_course_message(missing: &[&str]) -> String {
    format!("Course is incomplete. Missing: {}", missing.join(", "))
}

pub fn incomplete_chapter_message(missing: &[&str]) -> String {
    format!("Chapter is incomplete. Missing: {}", missing.join(", "))
}

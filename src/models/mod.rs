use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated identity attempting an operation, as vouched for by the auth gateway.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Principal { user_id: user_id.into() }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<f64>,
    pub is_published: bool,
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the instructor's own course list.
#[derive(Debug, Serialize, Clone)]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub price: Option<f64>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: i64,
    pub is_published: bool,
    pub is_free: bool,
    pub course_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    pub course_id: String,
    pub created_at: DateTime<Utc>,
}

/// Local record pairing a chapter with its externally hosted video asset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VideoAssetRecord {
    pub id: String,
    pub asset_id: String,
    pub playback_id: Option<String>,
    pub chapter_id: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct CompletionProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub chapters: Vec<Chapter>,
    pub attachments: Vec<Attachment>,
    pub progress: CompletionProgress,
}

#[derive(Debug, Serialize)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub video_asset: Option<VideoAssetRecord>,
    pub progress: CompletionProgress,
}

// --- Typed patches, one per entity ---

/// The mutable fields of a course. Each variant carries its own validation rule.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CoursePatch {
    Title(String),
    Description(String),
    Category(String),
    ImageUrl(String),
    Price(f64),
}

impl CoursePatch {
    pub fn field_name(&self) -> &'static str {
        match self {
            CoursePatch::Title(_) => "title",
            CoursePatch::Description(_) => "description",
            CoursePatch::Category(_) => "category",
            CoursePatch::ImageUrl(_) => "image_url",
            CoursePatch::Price(_) => "price",
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ChapterPatch {
    Title(String),
    Description(String),
    IsFree(bool),
}

impl ChapterPatch {
    pub fn field_name(&self) -> &'static str {
        match self {
            ChapterPatch::Title(_) => "title",
            ChapterPatch::Description(_) => "description",
            ChapterPatch::IsFree(_) => "is_free",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChapterPosition {
    pub chapter_id: String,
    pub position: i64,
}

// --- Result shape returned to form handlers ---

/// Exactly one of `{id}`, `{success, data?}` or `{error}`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ActionResponse {
    Created {
        id: String,
    },
    Transitioned {
        success: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    Failed {
        error: String,
    },
}

impl ActionResponse {
    pub fn created(id: impl Into<String>) -> Self {
        ActionResponse::Created { id: id.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        ActionResponse::Transitioned { success: message.into(), data: None }
    }

    /// Falls back to a bare success message if the entity cannot be serialized.
    pub fn success_with<T: Serialize>(message: impl Into<String>, data: &T) -> Self {
        ActionResponse::Transitioned {
            success: message.into(),
            data: serde_json::to_value(data).ok(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ActionResponse::Failed { error: message.into() }
    }
}

pub mod db_operations;

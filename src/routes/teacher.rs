use crate::helper::cascade_helpers::Operation;
use crate::helper::{chapter_helpers, course_helpers};
use crate::middleware::MaybePrincipal;
use crate::models::{ActionResponse, ChapterPatch, ChapterPosition, CoursePatch};
use crate::routes::{respond, respond_read};
use crate::{AppState, DbPool};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

// --- Request bodies ---

#[derive(Deserialize)]
struct TitleRequest {
    title: String,
}

#[derive(Deserialize)]
struct AttachmentRequest {
    url: String,
}

#[derive(Deserialize)]
struct ReorderRequest {
    list: Vec<ChapterPosition>,
}

#[derive(Deserialize)]
struct VideoRequest {
    video_url: String,
}

// --- Route Configuration ---
pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/teacher/courses")
            .route("", web::post().to(create_course_action))
            .route("", web::get().to(list_courses_api))
            .route("/{course_id}", web::get().to(course_detail_api))
            .route("/{course_id}", web::patch().to(update_course_action))
            .route("/{course_id}", web::delete().to(delete_course_action))
            .route("/{course_id}/publish", web::post().to(publish_course_action))
            .route("/{course_id}/unpublish", web::post().to(unpublish_course_action))
            .route("/{course_id}/attachments", web::post().to(add_attachment_action))
            .route("/{course_id}/attachments/{attachment_id}", web::delete().to(delete_attachment_action))
            .route("/{course_id}/chapters", web::post().to(create_chapter_action))
            .route("/{course_id}/chapters/reorder", web::put().to(reorder_chapters_action))
            .route("/{course_id}/chapters/{chapter_id}", web::get().to(chapter_detail_api))
            .route("/{course_id}/chapters/{chapter_id}", web::patch().to(update_chapter_action))
            .route("/{course_id}/chapters/{chapter_id}", web::delete().to(delete_chapter_action))
            .route("/{course_id}/chapters/{chapter_id}/video", web::put().to(set_chapter_video_action))
            .route("/{course_id}/chapters/{chapter_id}/publish", web::post().to(publish_chapter_action))
            .route("/{course_id}/chapters/{chapter_id}/unpublish", web::post().to(unpublish_chapter_action)),
    );
}

// --- Courses ---

async fn list_courses_api(pool: web::Data<DbPool>, principal: MaybePrincipal) -> impl Responder {
    respond_read("own courses", course_helpers::list_own_courses(&pool, principal.as_ref()))
}

async fn course_detail_api(pool: web::Data<DbPool>, principal: MaybePrincipal, path: web::Path<String>) -> impl Responder {
    respond_read("course", course_helpers::course_detail(&pool, principal.as_ref(), &path))
}

async fn create_course_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    body: web::Json<TitleRequest>,
) -> HttpResponse {
    let result = course_helpers::create_course(&pool, principal.as_ref(), &body.title);
    respond(Operation::CreateCourse, result, ActionResponse::created)
}

async fn update_course_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<String>,
    body: web::Json<CoursePatch>,
) -> HttpResponse {
    let result = course_helpers::update_course(&pool, principal.as_ref(), &path, &body);
    respond(Operation::UpdateCourseField, result, ActionResponse::created)
}

async fn delete_course_action(
    pool: web::Data<DbPool>,
    state: web::Data<AppState>,
    principal: MaybePrincipal,
    path: web::Path<String>,
) -> HttpResponse {
    let result = course_helpers::delete_course(&pool, state.video_host.as_ref(), principal.as_ref(), &path).await;
    respond(Operation::DeleteCourse, result, |_| ActionResponse::success("Course deleted"))
}

async fn publish_course_action(pool: web::Data<DbPool>, principal: MaybePrincipal, path: web::Path<String>) -> HttpResponse {
    let result = course_helpers::publish_course(&pool, principal.as_ref(), &path);
    respond(Operation::PublishCourse, result, |course| ActionResponse::success_with("Course published", &course))
}

async fn unpublish_course_action(pool: web::Data<DbPool>, principal: MaybePrincipal, path: web::Path<String>) -> HttpResponse {
    let result = course_helpers::unpublish_course(&pool, principal.as_ref(), &path);
    respond(Operation::UnpublishCourse, result, |course| ActionResponse::success_with("Course unpublished", &course))
}

async fn add_attachment_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<String>,
    body: web::Json<AttachmentRequest>,
) -> HttpResponse {
    let result = course_helpers::add_attachment(&pool, principal.as_ref(), &path, &body.url);
    respond(Operation::AddCourseAttachment, result, |attachment| {
        ActionResponse::success_with("Attachment added", &attachment)
    })
}

async fn delete_attachment_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (course_id, attachment_id) = path.into_inner();
    let result = course_helpers::delete_attachment(&pool, principal.as_ref(), &course_id, &attachment_id);
    respond(Operation::DeleteCourseAttachment, result, |_| ActionResponse::success("Attachment deleted"))
}

// --- Chapters ---

async fn create_chapter_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<String>,
    body: web::Json<TitleRequest>,
) -> HttpResponse {
    let result = chapter_helpers::create_chapter(&pool, principal.as_ref(), &path, &body.title);
    respond(Operation::CreateChapter, result, ActionResponse::created)
}

async fn reorder_chapters_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<String>,
    body: web::Json<ReorderRequest>,
) -> HttpResponse {
    let result = chapter_helpers::reorder_chapters(&pool, principal.as_ref(), &path, &body.list);
    respond(Operation::ReorderChapters, result, |_| ActionResponse::success("Chapters reordered"))
}

async fn chapter_detail_api(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (course_id, chapter_id) = path.into_inner();
    respond_read("chapter", chapter_helpers::chapter_detail(&pool, principal.as_ref(), &course_id, &chapter_id))
}

async fn update_chapter_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
    body: web::Json<ChapterPatch>,
) -> HttpResponse {
    let (course_id, chapter_id) = path.into_inner();
    let result = chapter_helpers::update_chapter(&pool, principal.as_ref(), &course_id, &chapter_id, &body);
    respond(Operation::UpdateChapterField, result, ActionResponse::created)
}

async fn set_chapter_video_action(
    pool: web::Data<DbPool>,
    state: web::Data<AppState>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
    body: web::Json<VideoRequest>,
) -> HttpResponse {
    let (course_id, chapter_id) = path.into_inner();
    let result = chapter_helpers::set_chapter_video(
        &pool,
        state.video_host.as_ref(),
        principal.as_ref(),
        &course_id,
        &chapter_id,
        &body.video_url,
    )
    .await;
    respond(Operation::SetChapterVideo, result, ActionResponse::created)
}

async fn delete_chapter_action(
    pool: web::Data<DbPool>,
    state: web::Data<AppState>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (course_id, chapter_id) = path.into_inner();
    let result =
        chapter_helpers::delete_chapter(&pool, state.video_host.as_ref(), principal.as_ref(), &course_id, &chapter_id).await;
    respond(Operation::DeleteChapter, result, |_| ActionResponse::success("Chapter deleted"))
}

async fn publish_chapter_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (course_id, chapter_id) = path.into_inner();
    let result = chapter_helpers::publish_chapter(&pool, principal.as_ref(), &course_id, &chapter_id);
    respond(Operation::PublishChapter, result, |chapter| ActionResponse::success_with("Chapter published", &chapter))
}

async fn unpublish_chapter_action(
    pool: web::Data<DbPool>,
    principal: MaybePrincipal,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (course_id, chapter_id) = path.into_inner();
    let result = chapter_helpers::unpublish_chapter(&pool, principal.as_ref(), &course_id, &chapter_id);
    respond(Operation::UnpublishChapter, result, |chapter| ActionResponse::success_with("Chapter unpublished", &chapter))
}

use crate::helper::cascade_helpers::{run_post_mutation_hooks, Operation};
use crate::helper::completeness_helpers;
use crate::helper::ownership_helpers::{authorize, authorize_chapter};
use crate::helper::sanitization_helpers::{sanitize_rich_text, strip_all_html};
use crate::helper::video_helpers::{release_remote_assets, VideoAsset, VideoHost};
use crate::helper::{get_conn, require_text, write_transaction, ActionError};
use crate::models::db_operations::{chapters_db_operations, video_assets_db_operations};
use crate::models::{Chapter, ChapterDetail, ChapterPatch, ChapterPosition, Principal, VideoAssetRecord};
use crate::DbPool;
use std::collections::HashSet;

fn validate_chapter_patch(patch: &ChapterPatch) -> Result<ChapterPatch, ActionError> {
    Ok(match patch {
        ChapterPatch::Title(title) => ChapterPatch::Title(require_text(&strip_all_html(title), "Title")?),
        ChapterPatch::Description(text) => ChapterPatch::Description(sanitize_rich_text(&require_text(text, "Description")?)),
        ChapterPatch::IsFree(is_free) => ChapterPatch::IsFree(*is_free),
    })
}

/// Rejects payloads that could never be applied as a consistent ordering.
fn validate_reorder(items: &[ChapterPosition]) -> Result<(), ActionError> {
    let mut ids = HashSet::new();
    let mut positions = HashSet::new();
    for item in items {
        if item.position < 1 {
            return Err(ActionError::Validation("Positions must start at 1".to_string()));
        }
        if !ids.insert(item.chapter_id.as_str()) {
            return Err(ActionError::Validation(format!("Chapter {} appears more than once", item.chapter_id)));
        }
        if !positions.insert(item.position) {
            return Err(ActionError::Validation(format!("Position {} is used more than once", item.position)));
        }
    }
    Ok(())
}

/// Every chapter in the payload must belong to the course, and no target position may
/// still be held by a chapter the payload leaves where it is.
fn validate_reorder_against(current: &[Chapter], items: &[ChapterPosition]) -> Result<(), ActionError> {
    let moving: HashSet<&str> = items.iter().map(|item| item.chapter_id.as_str()).collect();
    if moving.iter().any(|id| !current.iter().any(|chapter| chapter.id == *id)) {
        return Err(ActionError::NotFound("Chapter".to_string()));
    }
    for item in items {
        let holder = current
            .iter()
            .find(|chapter| chapter.position == item.position && !moving.contains(chapter.id.as_str()));
        if let Some(holder) = holder {
            return Err(ActionError::Validation(format!(
                "Position {} is already taken by \"{}\"",
                item.position, holder.title
            )));
        }
    }
    Ok(())
}

pub fn create_chapter(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    title: &str,
) -> Result<String, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize(&tx, principal, course_id)?;
    let title = require_text(&strip_all_html(title), "Title")?;
    let chapter = chapters_db_operations::create_chapter(&tx, course_id, &title)?;
    run_post_mutation_hooks(&tx, Operation::CreateChapter, course_id)?;
    tx.commit()?;
    Ok(chapter.id)
}

/// Applies the whole ordering or none of it.
pub fn reorder_chapters(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    items: &[ChapterPosition],
) -> Result<(), ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize(&tx, principal, course_id)?;
    validate_reorder(items)?;
    let current = chapters_db_operations::read_chapters_for_course(&tx, course_id)?;
    validate_reorder_against(&current, items)?;
    chapters_db_operations::apply_chapter_positions(&tx, course_id, items)?;
    run_post_mutation_hooks(&tx, Operation::ReorderChapters, course_id)?;
    tx.commit()?;
    Ok(())
}

pub fn update_chapter(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
    patch: &ChapterPatch,
) -> Result<String, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize_chapter(&tx, principal, course_id, chapter_id)?;
    let patch = validate_chapter_patch(patch)?;
    chapters_db_operations::update_chapter_field(&tx, course_id, chapter_id, &patch)?;
    run_post_mutation_hooks(&tx, Operation::UpdateChapterField, course_id)?;
    tx.commit()?;
    Ok(chapter_id.to_string())
}

/// Local half of `set_chapter_video`. Returns the record the new asset replaced.
fn attach_video_locally(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
    video_url: &str,
    asset: &VideoAsset,
) -> Result<Option<VideoAssetRecord>, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize_chapter(&tx, principal, course_id, chapter_id)?;
    let previous = video_assets_db_operations::read_video_asset_for_chapter(&tx, chapter_id)?;
    chapters_db_operations::set_chapter_video_url(&tx, course_id, chapter_id, video_url)?;
    video_assets_db_operations::replace_video_asset(&tx, chapter_id, &asset.asset_id, asset.playback_id.as_deref())?;
    run_post_mutation_hooks(&tx, Operation::SetChapterVideo, course_id)?;
    tx.commit()?;
    Ok(previous)
}

/// Points the chapter at a new video and swaps its hosted asset.
///
/// The new asset is created first and the local change committed second; if the
/// commit fails the new asset is deleted again. The replaced asset is only
/// released once the new one is durable.
pub async fn set_chapter_video(
    pool: &DbPool,
    host: &dyn VideoHost,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
    video_url: &str,
) -> Result<String, ActionError> {
    {
        let conn = get_conn(pool)?;
        authorize_chapter(&conn, principal, course_id, chapter_id)?;
    }
    let video_url = require_text(video_url, "Video URL")?;

    let asset = host.create_asset(&video_url).await?;

    let previous = match attach_video_locally(pool, principal, course_id, chapter_id, &video_url, &asset) {
        Ok(previous) => previous,
        Err(e) => {
            log::warn!("Rolling back video asset {} for chapter {}: {}", asset.asset_id, chapter_id, e);
            release_remote_assets(pool, host, &[asset.asset_id], "video attach rolled back").await;
            return Err(e);
        }
    };

    if let Some(previous) = previous.filter(|p| p.asset_id != asset.asset_id) {
        release_remote_assets(pool, host, &[previous.asset_id], "video replaced").await;
    }
    Ok(chapter_id.to_string())
}

pub async fn delete_chapter(
    pool: &DbPool,
    host: &dyn VideoHost,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
) -> Result<(), ActionError> {
    let asset = {
        let mut conn = get_conn(pool)?;
        let tx = write_transaction(&mut conn)?;
        authorize_chapter(&tx, principal, course_id, chapter_id)?;
        let asset = video_assets_db_operations::read_video_asset_for_chapter(&tx, chapter_id)?;
        chapters_db_operations::delete_chapter(&tx, course_id, chapter_id)?;
        run_post_mutation_hooks(&tx, Operation::DeleteChapter, course_id)?;
        tx.commit()?;
        asset
    };

    if let Some(asset) = asset {
        release_remote_assets(pool, host, &[asset.asset_id], "chapter deleted").await;
    }
    Ok(())
}

pub fn publish_chapter(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
) -> Result<Chapter, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    let (_, chapter) = authorize_chapter(&tx, principal, course_id, chapter_id)?;

    let has_asset = video_assets_db_operations::read_video_asset_for_chapter(&tx, chapter_id)?.is_some();
    let missing = completeness_helpers::missing_chapter_requirements(&chapter, has_asset);
    if !missing.is_empty() {
        return Err(ActionError::IncompleteForPublish(completeness_helpers::incomplete_chapter_message(&missing)));
    }

    chapters_db_operations::set_chapter_published(&tx, course_id, chapter_id, true)?;
    run_post_mutation_hooks(&tx, Operation::PublishChapter, course_id)?;
    let chapter = chapters_db_operations::read_chapter(&tx, course_id, chapter_id)?
        .ok_or_else(|| ActionError::NotFound("Chapter".to_string()))?;
    tx.commit()?;

    log::info!("Chapter {} of course {} published.", chapter_id, course_id);
    Ok(chapter)
}

pub fn unpublish_chapter(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
) -> Result<Chapter, ActionError> {
    let mut conn = get_conn(pool)?;
    let tx = write_transaction(&mut conn)?;
    authorize_chapter(&tx, principal, course_id, chapter_id)?;
    chapters_db_operations::set_chapter_published(&tx, course_id, chapter_id, false)?;
    run_post_mutation_hooks(&tx, Operation::UnpublishChapter, course_id)?;
    let chapter = chapters_db_operations::read_chapter(&tx, course_id, chapter_id)?
        .ok_or_else(|| ActionError::NotFound("Chapter".to_string()))?;
    tx.commit()?;

    log::info!("Chapter {} of course {} un-published.", chapter_id, course_id);
    Ok(chapter)
}

pub fn chapter_detail(
    pool: &DbPool,
    principal: Option<&Principal>,
    course_id: &str,
    chapter_id: &str,
) -> Result<ChapterDetail, ActionError> {
    let conn = get_conn(pool)?;
    let (_, chapter) = authorize_chapter(&conn, principal, course_id, chapter_id)?;
    let video_asset = video_assets_db_operations::read_video_asset_for_chapter(&conn, chapter_id)?;
    let progress = completeness_helpers::chapter_progress(&chapter, video_asset.is_some());
    Ok(ChapterDetail { chapter, video_asset, progress })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::course_helpers;
    use crate::helper::test_support::{self, FakeVideoHost};
    use crate::helper::video_helpers::VideoHostError;

    fn owner() -> Principal {
        Principal::new("owner")
    }

    fn titles_in_order(pool: &DbPool, course_id: &str) -> Vec<(String, i64)> {
        let conn = pool.get().unwrap();
        chapters_db_operations::read_chapters_for_course(&conn, course_id)
            .unwrap()
            .into_iter()
            .map(|c| (c.title, c.position))
            .collect()
    }

    fn orphans(pool: &DbPool) -> Vec<String> {
        let conn = pool.get().unwrap();
        video_assets_db_operations::list_orphaned_assets(&conn).unwrap()
    }

    #[test]
    fn chapters_are_appended_in_order() {
        let pool = test_support::pool();
        let course_id = course_helpers::create_course(&pool, Some(&owner()), "Rust").unwrap();

        let first = create_chapter(&pool, Some(&owner()), &course_id, "Intro").unwrap();
        create_chapter(&pool, Some(&owner()), &course_id, "Ownership").unwrap();
        let chapter = test_support::chapter_row(&pool, &course_id, &first);
        assert_eq!(chapter.position, 1);
        assert!(!chapter.is_published);
        assert_eq!(titles_in_order(&pool, &course_id), vec![("Intro".to_string(), 1), ("Ownership".to_string(), 2)]);

        let err = create_chapter(&pool, Some(&Principal::new("stranger")), &course_id, "Nope").unwrap_err();
        assert!(matches!(err, ActionError::NotOwner));
    }

    #[test]
    fn reorder_swaps_and_rolls_back_as_a_whole() {
        let pool = test_support::pool();
        let course_id = course_helpers::create_course(&pool, Some(&owner()), "Rust").unwrap();
        let a = create_chapter(&pool, Some(&owner()), &course_id, "A").unwrap();
        let b = create_chapter(&pool, Some(&owner()), &course_id, "B").unwrap();

        let swap = [
            ChapterPosition { chapter_id: a.clone(), position: 2 },
            ChapterPosition { chapter_id: b.clone(), position: 1 },
        ];
        reorder_chapters(&pool, Some(&owner()), &course_id, &swap).unwrap();
        assert_eq!(titles_in_order(&pool, &course_id), vec![("B".to_string(), 1), ("A".to_string(), 2)]);

        let with_unknown = [
            ChapterPosition { chapter_id: a.clone(), position: 1 },
            ChapterPosition { chapter_id: "missing".to_string(), position: 2 },
        ];
        let err = reorder_chapters(&pool, Some(&owner()), &course_id, &with_unknown).unwrap_err();
        assert_eq!(err.user_message(), "Chapter not found");
        assert_eq!(titles_in_order(&pool, &course_id), vec![("B".to_string(), 1), ("A".to_string(), 2)]);

        let duplicate = [
            ChapterPosition { chapter_id: a.clone(), position: 3 },
            ChapterPosition { chapter_id: b.clone(), position: 3 },
        ];
        assert!(matches!(reorder_chapters(&pool, Some(&owner()), &course_id, &duplicate), Err(ActionError::Validation(_))));
        let zero = [ChapterPosition { chapter_id: a, position: 0 }];
        assert!(matches!(reorder_chapters(&pool, Some(&owner()), &course_id, &zero), Err(ActionError::Validation(_))));
    }

    #[test]
    fn reorder_onto_a_sibling_left_in_place_is_rejected() {
        let pool = test_support::pool();
        let course_id = course_helpers::create_course(&pool, Some(&owner()), "Rust").unwrap();
        let a = create_chapter(&pool, Some(&owner()), &course_id, "A").unwrap();
        create_chapter(&pool, Some(&owner()), &course_id, "B").unwrap();

        let onto_b = [ChapterPosition { chapter_id: a.clone(), position: 2 }];
        let err = reorder_chapters(&pool, Some(&owner()), &course_id, &onto_b).unwrap_err();
        assert!(matches!(err, ActionError::Validation(_)));
        assert!(!err.is_fault());
        assert_eq!(err.user_message(), "Position 2 is already taken by \"B\"");
        assert_eq!(titles_in_order(&pool, &course_id), vec![("A".to_string(), 1), ("B".to_string(), 2)]);

        // A free position is fine without listing the other chapters.
        let to_end = [ChapterPosition { chapter_id: a, position: 3 }];
        reorder_chapters(&pool, Some(&owner()), &course_id, &to_end).unwrap();
        assert_eq!(titles_in_order(&pool, &course_id), vec![("B".to_string(), 2), ("A".to_string(), 3)]);
    }

    #[test]
    fn chapter_fields_are_validated_and_sanitized() {
        let pool = test_support::pool();
        let course_id = course_helpers::create_course(&pool, Some(&owner()), "Rust").unwrap();
        let id = create_chapter(&pool, Some(&owner()), &course_id, "Intro").unwrap();

        let err = update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::Title(" ".to_string())).unwrap_err();
        assert_eq!(err.user_message(), "Title is required");

        update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::Description("<i>hi</i>".to_string())).unwrap();
        update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::IsFree(true)).unwrap();
        update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::IsFree(false)).unwrap();

        let chapter = test_support::chapter_row(&pool, &course_id, &id);
        assert_eq!(chapter.description.as_deref(), Some("hi"));
        assert!(!chapter.is_free);

        update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::Description("if a < b && c".to_string())).unwrap();
        update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::Title("Traits & Generics".to_string())).unwrap();
        let chapter = test_support::chapter_row(&pool, &course_id, &id);
        assert_eq!(chapter.description.as_deref(), Some("if a < b && c"));
        assert_eq!(chapter.title, "Traits & Generics");
    }

    #[actix_web::test]
    async fn non_owner_cannot_reorder_unpublish_or_delete_chapters() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 2);
        course_helpers::publish_course(&pool, Some(&owner()), &course.id).unwrap();
        let stranger = Principal::new("stranger");
        let before = titles_in_order(&pool, &course.id);

        let swap = [
            ChapterPosition { chapter_id: chapters[0].id.clone(), position: 2 },
            ChapterPosition { chapter_id: chapters[1].id.clone(), position: 1 },
        ];
        let err = reorder_chapters(&pool, Some(&stranger), &course.id, &swap).unwrap_err();
        assert!(matches!(err, ActionError::NotOwner));

        let err = unpublish_chapter(&pool, Some(&stranger), &course.id, &chapters[0].id).unwrap_err();
        assert!(matches!(err, ActionError::NotOwner));

        let err = delete_chapter(&pool, &host, Some(&stranger), &course.id, &chapters[1].id).await.unwrap_err();
        assert!(matches!(err, ActionError::NotOwner));

        assert_eq!(titles_in_order(&pool, &course.id), before);
        for chapter in &chapters {
            assert_eq!(&test_support::chapter_row(&pool, &course.id, &chapter.id), chapter);
        }
        assert!(test_support::course_row(&pool, &course.id).is_published);
        assert!(host.deleted().is_empty());
        assert!(orphans(&pool).is_empty());
    }

    #[test]
    fn publish_chapter_requires_a_video_asset() {
        let pool = test_support::pool();
        let course_id = course_helpers::create_course(&pool, Some(&owner()), "Rust").unwrap();
        let id = create_chapter(&pool, Some(&owner()), &course_id, "Intro").unwrap();
        update_chapter(&pool, Some(&owner()), &course_id, &id, &ChapterPatch::Description("Basics".to_string())).unwrap();
        {
            let conn = pool.get().unwrap();
            chapters_db_operations::set_chapter_video_url(&conn, &course_id, &id, "https://files/intro.mp4").unwrap();
        }

        let err = publish_chapter(&pool, Some(&owner()), &course_id, &id).unwrap_err();
        assert_eq!(err.user_message(), "Chapter is incomplete. Missing: processed video asset");
        assert!(!test_support::chapter_row(&pool, &course_id, &id).is_published);
        assert_eq!(chapter_detail(&pool, Some(&owner()), &course_id, &id).unwrap().progress.completed, 3);
    }

    #[test]
    fn unpublishing_the_last_published_chapter_unpublishes_the_course() {
        let pool = test_support::pool();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 2);
        course_helpers::publish_course(&pool, Some(&owner()), &course.id).unwrap();

        unpublish_chapter(&pool, Some(&owner()), &course.id, &chapters[0].id).unwrap();
        assert!(test_support::course_row(&pool, &course.id).is_published);

        let chapter = unpublish_chapter(&pool, Some(&owner()), &course.id, &chapters[1].id).unwrap();
        assert!(!chapter.is_published);
        assert!(!test_support::course_row(&pool, &course.id).is_published);

        // Publishing a chapter again does not bring the course back on its own.
        publish_chapter(&pool, Some(&owner()), &course.id, &chapters[1].id).unwrap();
        assert!(!test_support::course_row(&pool, &course.id).is_published);
    }

    #[actix_web::test]
    async fn deleting_the_only_published_chapter_unpublishes_the_course() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);
        course_helpers::publish_course(&pool, Some(&owner()), &course.id).unwrap();

        delete_chapter(&pool, &host, Some(&owner()), &course.id, &chapters[0].id).await.unwrap();

        assert!(!test_support::course_row(&pool, &course.id).is_published);
        assert_eq!(host.deleted(), vec!["seed_asset_1".to_string()]);
        let err = chapter_detail(&pool, Some(&owner()), &course.id, &chapters[0].id).unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
    }

    #[actix_web::test]
    async fn unpublished_siblings_do_not_keep_the_course_live() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);
        let draft = create_chapter(&pool, Some(&owner()), &course.id, "Draft").unwrap();
        course_helpers::publish_course(&pool, Some(&owner()), &course.id).unwrap();

        delete_chapter(&pool, &host, Some(&owner()), &course.id, &chapters[0].id).await.unwrap();

        assert!(!test_support::course_row(&pool, &course.id).is_published);
        assert!(!test_support::chapter_row(&pool, &course.id, &draft).is_published);
    }

    #[actix_web::test]
    async fn deleting_one_of_several_published_chapters_keeps_the_course_live() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 2);
        course_helpers::publish_course(&pool, Some(&owner()), &course.id).unwrap();

        delete_chapter(&pool, &host, Some(&owner()), &course.id, &chapters[1].id).await.unwrap();
        assert!(test_support::course_row(&pool, &course.id).is_published);
    }

    #[actix_web::test]
    async fn replacing_a_video_releases_the_old_asset_after_commit() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);
        let chapter_id = &chapters[0].id;

        set_chapter_video(&pool, &host, Some(&owner()), &course.id, chapter_id, "https://files/v2.mp4").await.unwrap();

        assert_eq!(host.created(), vec!["asset_1".to_string()]);
        assert_eq!(host.deleted(), vec!["seed_asset_1".to_string()]);
        let detail = chapter_detail(&pool, Some(&owner()), &course.id, chapter_id).unwrap();
        assert_eq!(detail.chapter.video_url.as_deref(), Some("https://files/v2.mp4"));
        let record = detail.video_asset.unwrap();
        assert_eq!(record.asset_id, "asset_1");
        assert_eq!(record.playback_id.as_deref(), Some("play_1"));
    }

    #[actix_web::test]
    async fn video_guard_runs_before_the_host_is_called() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);

        let err = set_chapter_video(&pool, &host, Some(&Principal::new("stranger")), &course.id, &chapters[0].id, "https://files/x.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotOwner));
        let err = set_chapter_video(&pool, &host, None, &course.id, &chapters[0].id, "https://files/x.mp4").await.unwrap_err();
        assert!(matches!(err, ActionError::Unauthenticated));
        assert!(host.created().is_empty());
    }

    #[actix_web::test]
    async fn host_failure_leaves_the_chapter_untouched() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        host.fail_creates();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);

        let err = set_chapter_video(&pool, &host, Some(&owner()), &course.id, &chapters[0].id, "https://files/v2.mp4")
            .await
            .unwrap_err();
        assert!(err.is_fault());
        assert_eq!(test_support::chapter_row(&pool, &course.id, &chapters[0].id), chapters[0]);
    }

    /// Deletes the chapter while the host is busy creating the asset.
    struct VanishingChapterHost {
        inner: FakeVideoHost,
        pool: DbPool,
        course_id: String,
        chapter_id: String,
    }

    #[async_trait::async_trait]
    impl VideoHost for VanishingChapterHost {
        async fn create_asset(&self, source_url: &str) -> Result<VideoAsset, VideoHostError> {
            {
                let conn = self.pool.get().unwrap();
                chapters_db_operations::delete_chapter(&conn, &self.course_id, &self.chapter_id).unwrap();
            }
            self.inner.create_asset(source_url).await
        }

        async fn delete_asset(&self, asset_id: &str) -> Result<(), VideoHostError> {
            self.inner.delete_asset(asset_id).await
        }
    }

    #[actix_web::test]
    async fn failed_local_write_deletes_the_new_asset() {
        let pool = test_support::pool();
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);
        let host = VanishingChapterHost {
            inner: FakeVideoHost::new(),
            pool: pool.clone(),
            course_id: course.id.clone(),
            chapter_id: chapters[0].id.clone(),
        };

        let err = set_chapter_video(&pool, &host, Some(&owner()), &course.id, &chapters[0].id, "https://files/v2.mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
        assert_eq!(host.inner.created(), vec!["asset_1".to_string()]);
        assert_eq!(host.inner.deleted(), vec!["asset_1".to_string()]);
        assert!(orphans(&pool).is_empty());
    }

    #[actix_web::test]
    async fn undeletable_old_asset_is_recorded_as_orphan() {
        let pool = test_support::pool();
        let host = FakeVideoHost::new();
        host.fail_deletes(true);
        let (course, chapters) = test_support::seed_complete_course(&pool, "owner", 1);

        set_chapter_video(&pool, &host, Some(&owner()), &course.id, &chapters[0].id, "https://files/v2.mp4").await.unwrap();

        assert_eq!(orphans(&pool), vec!["seed_asset_1".to_string()]);
        let conn = pool.get().unwrap();
        let record = video_assets_db_operations::read_video_asset_for_chapter(&conn, &chapters[0].id).unwrap().unwrap();
        assert_eq!(record.asset_id, "asset_1");
    }
}

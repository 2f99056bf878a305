//! Post detail plus the write operations on posts and comments.

use models::{comment, group, post, user};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::blog::BlogService;
use crate::errors::ServiceError;
use crate::media::ImageUpload;
use crate::observability::{COMMENTS_CREATED_TOTAL, POSTS_CREATED_TOTAL};
use crate::views::{single_post_view, AuthorView, CommentView, PostView};

/// Fields a user may set on a post. `image` is a new upload; leaving it out
/// on edit keeps the current image.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub text: String,
    pub group: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: PostView,
    pub author: AuthorView,
    pub author_post_count: u64,
    pub comments: Vec<CommentView>,
}

impl BlogService {
    async fn ensure_group(&self, group_id: Option<Uuid>) -> Result<Option<group::Model>, ServiceError> {
        let Some(id) = group_id else { return Ok(None) };
        group::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Some)
            .ok_or_else(|| ServiceError::Validation("unknown group".into()))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<post::Model, ServiceError> {
        post::Entity::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))
    }

    /// A post with its author, group and comments (newest first).
    #[instrument(skip(self))]
    pub async fn post_detail(&self, post_id: Uuid) -> Result<PostDetail, ServiceError> {
        let (found, author) = post::Entity::find_by_id(post_id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;
        let author = author.ok_or_else(|| ServiceError::not_found("author"))?;
        let group = match found.group_id {
            Some(id) => group::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };
        let author_post_count = post::Entity::find()
            .filter(post::Column::AuthorId.eq(author.id))
            .count(&self.db)
            .await?;
        let comments = comment::list_for_post(&self.db, post_id)
            .await?
            .into_iter()
            .map(|(c, a)| CommentView::new(c, a))
            .collect();
        Ok(PostDetail {
            post: single_post_view(found, &author, group.as_ref()),
            author: AuthorView::from(&author),
            author_post_count,
            comments,
        })
    }

    /// Publish a post as `author`.
    /// Validate everything except the upload, then store the upload.
    async fn prepare(&self, form: &PostForm) -> Result<Option<String>, ServiceError> {
        post::validate_text(&form.text)?;
        self.ensure_group(form.group).await?;
        match &form.image {
            Some(upload) => Ok(Some(self.media.save_post_image(upload).await?)),
            None => Ok(None),
        }
    }

    /// Undo a stored upload when the row that would reference it was not written.
    async fn discard_on_error<T>(&self, stored: Option<&str>, res: Result<T, ServiceError>) -> Result<T, ServiceError> {
        if res.is_err() {
            if let Some(path) = stored {
                self.media.remove(path).await;
            }
        }
        res
    }

    /// Publish a post as `author`.
    #[instrument(skip(self, author, form), fields(author = %author.username))]
    pub async fn create_post(&self, author: &user::Model, form: PostForm) -> Result<post::Model, ServiceError> {
        let image = self.prepare(&form).await?;
        let res = post::create(&self.db, author.id, &form.text, form.group, image.as_deref()).await.map_err(Into::into);
        let created = self.discard_on_error(image.as_deref(), res).await?;
        self.cache.invalidate_all();
        POSTS_CREATED_TOTAL.inc();
        info!(post_id = %created.id, image = ?created.image, "post_created");
        Ok(created)
    }

    /// Edit a post; only its author may do so.
    #[instrument(skip(self, editor, form), fields(editor = %editor.username))]
    pub async fn edit_post(&self, editor: &user::Model, post_id: Uuid, form: PostForm) -> Result<post::Model, ServiceError> {
        let existing = self.find_post(post_id).await?;
        if existing.author_id != editor.id {
            return Err(ServiceError::Forbidden("only the author can edit a post".into()));
        }
        let image = self.prepare(&form).await?;
        let res = post::update(&self.db, post_id, &form.text, form.group, image.as_deref()).await.map_err(Into::into);
        let updated = self.discard_on_error(image.as_deref(), res).await?;
        self.cache.invalidate_all();
        info!(%post_id, "post_edited");
        Ok(updated)
    }

    /// Comment on a post as `author`.
    #[instrument(skip(self, author, form), fields(author = %author.username))]
    pub async fn add_comment(&self, author: &user::Model, post_id: Uuid, form: CommentForm) -> Result<comment::Model, ServiceError> {
        self.find_post(post_id).await?;
        let created = comment::create(&self.db, post_id, author.id, &form.text).await?;
        self.cache.invalidate_all();
        COMMENTS_CREATED_TOTAL.inc();
        info!(%post_id, comment_id = %created.id, "comment_added");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{blog, log_test_case, SMALL_GIF};

    #[tokio::test]
    async fn create_post_counts_and_invalidates_cache() -> Result<(), anyhow::Error> {
        log_test_case("a valid form creates a post and refreshes the home feed");
        let svc = blog().await?;
        let author = user::create(svc.db(), "TestPotest", "tp@example.com", "", "").await?;
        let before_json = svc.home_feed_json(None).await?;

        let before = post::Entity::find().count(svc.db()).await?;
        let created = svc.create_post(&author, PostForm { text: "Старый текст".into(), ..Default::default() }).await?;
        assert_eq!(post::Entity::find().count(svc.db()).await?, before + 1);
        assert_eq!(created.author_id, author.id);

        let after_json = svc.home_feed_json(None).await?;
        assert_ne!(before_json, after_json);
        assert!(after_json.contains("Старый текст"));
        Ok(())
    }

    #[tokio::test]
    async fn create_post_rejects_unknown_group_and_empty_text() -> Result<(), anyhow::Error> {
        log_test_case("invalid post forms are rejected without writes");
        let svc = blog().await?;
        let author = user::create(svc.db(), "bad", "bad@example.com", "", "").await?;

        let unknown = svc.create_post(&author, PostForm { text: "t".into(), group: Some(Uuid::new_v4()), image: None }).await;
        assert!(matches!(unknown, Err(ServiceError::Validation(_))));
        let empty = svc.create_post(&author, PostForm::default()).await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));
        assert_eq!(post::Entity::find().count(svc.db()).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn edit_post_by_author_changes_text_and_group() -> Result<(), anyhow::Error> {
        log_test_case("a valid edit form updates the post in place");
        let svc = blog().await?;
        let author = user::create(svc.db(), "editor", "ed@example.com", "", "").await?;
        let g = group::create(svc.db(), "Тестовая группа", "test_slug", "d").await?;
        let p = svc.create_post(&author, PostForm { text: "Тестовый пост".into(), ..Default::default() }).await?;

        let count = post::Entity::find().count(svc.db()).await?;
        let updated = svc.edit_post(&author, p.id, PostForm { text: "Новый текст".into(), group: Some(g.id), image: None }).await?;
        assert_eq!(updated.text, "Новый текст");
        assert_eq!(updated.group_id, Some(g.id));
        assert_eq!(post::Entity::find().count(svc.db()).await?, count);
        Ok(())
    }

    #[tokio::test]
    async fn edit_post_by_someone_else_is_forbidden() -> Result<(), anyhow::Error> {
        log_test_case("only the author may edit a post");
        let svc = blog().await?;
        let author = user::create(svc.db(), "owner", "o@example.com", "", "").await?;
        let intruder = user::create(svc.db(), "intruder", "i@example.com", "", "").await?;
        let p = svc.create_post(&author, PostForm { text: "mine".into(), ..Default::default() }).await?;

        let res = svc.edit_post(&intruder, p.id, PostForm { text: "yours".into(), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));
        let missing = svc.edit_post(&author, Uuid::new_v4(), PostForm { text: "x".into(), ..Default::default() }).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));

        let unchanged = post::Entity::find_by_id(p.id).one(svc.db()).await?.unwrap();
        assert_eq!(unchanged.text, "mine");
        Ok(())
    }

    #[tokio::test]
    async fn comments_show_on_post_detail() -> Result<(), anyhow::Error> {
        log_test_case("a valid comment form adds a comment to the post");
        let svc = blog().await?;
        let author = user::create(svc.db(), "poster", "p@example.com", "Pat", "").await?;
        let reader = user::create(svc.db(), "reader", "r@example.com", "", "").await?;
        let g = group::create(svc.db(), "G", "g", "d").await?;
        let p = svc.create_post(&author, PostForm { text: "hello".into(), group: Some(g.id), image: Some(ImageUpload::new("small.gif", SMALL_GIF.to_vec())) }).await?;

        svc.add_comment(&reader, p.id, CommentForm { text: "Тестовый комментарий".into() }).await?;
        let detail = svc.post_detail(p.id).await?;
        assert_eq!(detail.post.id, p.id);
        let image = detail.post.image.clone().unwrap_or_default();
        assert!(image.starts_with("posts/") && image.ends_with(".gif"), "{image}");
        assert_eq!(tokio::fs::read(svc.media().root().join(&image)).await?, SMALL_GIF);
        assert_eq!(detail.post.group.as_ref().map(|g| g.slug.as_str()), Some("g"));
        assert_eq!(detail.author.username, "poster");
        assert_eq!(detail.author_post_count, 1);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].author, "reader");
        assert_eq!(detail.comments[0].text, "Тестовый комментарий");

        let missing = svc.add_comment(&reader, Uuid::new_v4(), CommentForm { text: "x".into() }).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.post_detail(Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn edit_post_invalidates_cached_home_feed() -> Result<(), anyhow::Error> {
        log_test_case("editing a post refreshes the cached home feed");
        let svc = blog().await?;
        let author = user::create(svc.db(), "reviser", "rev@example.com", "", "").await?;
        let p = svc.create_post(&author, PostForm { text: "draft".into(), ..Default::default() }).await?;

        let warm = svc.home_feed_json(None).await?;
        assert_eq!(svc.home_feed_json(None).await?, warm);

        svc.edit_post(&author, p.id, PostForm { text: "final".into(), ..Default::default() }).await?;
        let fresh = svc.home_feed_json(None).await?;
        assert_ne!(fresh, warm);
        assert!(fresh.contains("final"));
        assert!(!fresh.contains("draft"));
        Ok(())
    }

    #[tokio::test]
    async fn add_comment_invalidates_cached_home_feed() -> Result<(), anyhow::Error> {
        log_test_case("commenting clears the home feed cache");
        let svc = blog().await?;
        let author = user::create(svc.db(), "talker", "talk@example.com", "", "").await?;
        let p = svc.create_post(&author, PostForm { text: "topic".into(), ..Default::default() }).await?;
        let warm = svc.home_feed_json(None).await?;

        // a write the service does not see, so only invalidation can reveal it
        post::create(svc.db(), author.id, "behind_the_back", None, None).await?;
        assert_eq!(svc.home_feed_json(None).await?, warm);

        svc.add_comment(&author, p.id, CommentForm { text: "first!".into() }).await?;
        let fresh = svc.home_feed_json(None).await?;
        assert_ne!(fresh, warm);
        assert!(fresh.contains("behind_the_back"));
        Ok(())
    }

    #[tokio::test]
    async fn edit_without_upload_keeps_image_and_bad_upload_is_rejected() -> Result<(), anyhow::Error> {
        log_test_case("an edit without a new file keeps the image; a non-image upload fails");
        let svc = blog().await?;
        let author = user::create(svc.db(), "painter", "paint@example.com", "", "").await?;
        let gif = ImageUpload::new("small.gif", SMALL_GIF.to_vec());
        let p = svc.create_post(&author, PostForm { text: "with picture".into(), image: Some(gif), ..Default::default() }).await?;
        assert!(p.image.is_some());

        let kept = svc.edit_post(&author, p.id, PostForm { text: "retitled".into(), ..Default::default() }).await?;
        assert_eq!(kept.image, p.image);

        let fake = ImageUpload::new("fake.gif", b"not an image".to_vec());
        let res = svc.edit_post(&author, p.id, PostForm { text: "x".into(), image: Some(fake), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_post_does_not_leave_uploaded_file() -> Result<(), anyhow::Error> {
        log_test_case("a rejected form stores no image");
        let svc = blog().await?;
        let author = user::create(svc.db(), "tidy", "tidy@example.com", "", "").await?;
        let gif = ImageUpload::new("small.gif", SMALL_GIF.to_vec());
        let res = svc.create_post(&author, PostForm { text: String::new(), image: Some(gif), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert!(!svc.media().root().join("posts").exists());
        Ok(())
    }
}

//! List endpoints: every feed is an ordered post query cut by the paginator.

use models::{follow, group, post, user};
use sea_orm::{ColumnTrait, PaginatorTrait, QueryFilter, Select};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::blog::BlogService;
use crate::cache::FeedCache;
use crate::errors::ServiceError;
use crate::pagination::{Page, QuerySource};
use crate::views::{attach_relations, AuthorView, PostView};

/// Cache key namespace of the home feed.
pub const HOME_FEED: &str = "index";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFeed {
    pub group: group::Model,
    pub page: Page<PostView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFeed {
    pub author: AuthorView,
    pub post_count: u64,
    pub follower_count: u64,
    pub following: bool,
    pub page: Page<PostView>,
}

impl BlogService {
    async fn page_of(&self, select: Select<post::Entity>, page: Option<&str>) -> Result<Page<PostView>, ServiceError> {
        let source = QuerySource::new(&self.db, select);
        let raw = self.paginator.paginate(&source, page).await?;
        debug!(page = raw.page_number, total_pages = raw.total_pages, items = raw.len(), "feed_page");
        attach_relations(&self.db, raw).await
    }

    /// Every post, newest first.
    pub async fn home_feed(&self, page: Option<&str>) -> Result<Page<PostView>, ServiceError> {
        self.page_of(post::newest_first(), page).await
    }

    /// Home feed rendered to JSON, served from the cache when possible.
    #[instrument(skip(self))]
    pub async fn home_feed_json(&self, page: Option<&str>) -> Result<String, ServiceError> {
        let key = FeedCache::key(HOME_FEED, page);
        self.cache
            .get_or_render(key, move || async move {
                let feed = self.home_feed(page).await?;
                Ok::<_, ServiceError>(serde_json::to_string(&feed)?)
            })
            .await
    }

    /// Posts of one group; unknown slug is `NotFound`.
    #[instrument(skip(self))]
    pub async fn group_feed(&self, slug: &str, page: Option<&str>) -> Result<GroupFeed, ServiceError> {
        let group = group::find_by_slug(&self.db, slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("group"))?;
        let select = post::newest_first().filter(post::Column::GroupId.eq(group.id));
        let page = self.page_of(select, page).await?;
        Ok(GroupFeed { group, page })
    }

    /// Posts of one author plus whether `viewer` follows them.
    #[instrument(skip(self, viewer))]
    pub async fn profile_feed(&self, username: &str, page: Option<&str>, viewer: Option<&user::Model>) -> Result<ProfileFeed, ServiceError> {
        let author = self.user_by_username(username).await?;
        let select = post::newest_first().filter(post::Column::AuthorId.eq(author.id));
        let post_count = select.clone().count(&self.db).await?;
        let following = match viewer {
            Some(v) if v.id != author.id => follow::find(&self.db, v.id, author.id).await?.is_some(),
            _ => false,
        };
        let follower_count = follow::count_followers(&self.db, author.id).await?;
        let page = self.page_of(select, page).await?;
        Ok(ProfileFeed { author: AuthorView::from(&author), post_count, follower_count, following, page })
    }

    /// Posts by the authors `user_id` follows.
    #[instrument(skip(self))]
    pub async fn follow_feed(&self, user_id: Uuid, page: Option<&str>) -> Result<Page<PostView>, ServiceError> {
        let select = post::newest_first()
            .filter(post::Column::AuthorId.in_subquery(follow::followed_author_ids(user_id)));
        self.page_of(select, page).await
    }
}

use models::{follow, user};
use tracing::{info, instrument};

use crate::blog::BlogService;
use crate::errors::ServiceError;

impl BlogService {
    /// Follow `author_username`. Returns true when a new follow was created;
    /// following yourself or someone already followed changes nothing.
    #[instrument(skip(self, follower), fields(follower = %follower.username))]
    pub async fn follow(&self, follower: &user::Model, author_username: &str) -> Result<bool, ServiceError> {
        let author = self.user_by_username(author_username).await?;
        if author.id == follower.id {
            return Ok(false);
        }
        let (_, created) = follow::get_or_create(&self.db, follower.id, author.id).await?;
        if created {
            info!(author = %author.username, "author_followed");
        }
        Ok(created)
    }

    /// Stop following `author_username`. Returns true when a follow was removed.
    #[instrument(skip(self, follower), fields(follower = %follower.username))]
    pub async fn unfollow(&self, follower: &user::Model, author_username: &str) -> Result<bool, ServiceError> {
        let author = self.user_by_username(author_username).await?;
        let removed = follow::delete_pair(&self.db, follower.id, author.id).await?;
        if removed {
            info!(author = %author.username, "author_unfollowed");
        }
        Ok(removed)
    }
}

use configs::AppConfig;
use models::user;
use sea_orm::DatabaseConnection;

use crate::cache::FeedCache;
use crate::errors::ServiceError;
use crate::media::MediaStore;
use crate::pagination::Paginator;

/// Entry point for every blog operation.
///
/// Cheap to clone: the connection pool and the cache are shared handles.
#[derive(Clone)]
pub struct BlogService {
    pub(crate) db: DatabaseConnection,
    pub(crate) cache: FeedCache,
    pub(crate) paginator: Paginator,
    pub(crate) media: MediaStore,
}

impl BlogService {
    pub fn new(db: DatabaseConnection, cache: FeedCache, paginator: Paginator, media: MediaStore) -> Self {
        Self { db, cache, paginator, media }
    }

    pub fn from_config(db: DatabaseConnection, cfg: &AppConfig) -> Self {
        Self::new(
            db,
            FeedCache::from_config(&cfg.cache),
            Paginator::new(cfg.pagination.per_page),
            MediaStore::new(&cfg.server.media_dir),
        )
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// Look up an existing user or fail with `NotFound`.
    pub async fn user_by_username(&self, username: &str) -> Result<user::Model, ServiceError> {
        user::find_by_username(&self.db, username)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))
    }
}
